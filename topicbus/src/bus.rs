use std::{
    fmt, mem,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, ThreadId},
};

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

use crate::{
    Config, Envelope, Error, IntoResponse, Message, Response, Result, SubscriptionBuilder,
    SubscriptionId, SubscriptionInfo,
    internal::{Broker, CommandReceiver, WorkerCommand, WorkerHandle},
    monitoring::{DispatchMode, MonitorRegistry},
};

enum WorkerSlot {
    /// Stopped; the queue keeps whatever is posted until the next start.
    Idle(CommandReceiver),
    /// A worker thread owns the receiver. The running flag may already be
    /// cleared if stop was requested from the worker itself.
    Running(WorkerHandle),
    /// The receiver was lost with a failed thread; the next start opens a new queue.
    Closed,
}

/// In-process publish/subscribe bus.
///
/// Handlers subscribe to topic patterns for one message type; publishers
/// post values under concrete topics.
///
/// # Dispatch
///
/// - [`post()`](Self::post) runs every matching handler on the caller's
///   thread, in priority order, and returns their non-void responses.
/// - [`post_async()`](Self::post_async) enqueues the message and returns
///   immediately. A single worker thread drains the queue in FIFO order
///   and discards responses.
///
/// Both paths take a snapshot of matching subscriptions before running any
/// handler, so handlers may freely subscribe or unsubscribe. A failing or
/// panicking handler is logged, reported to [`monitors()`](Self::monitors),
/// and skipped; the publisher never sees the failure.
///
/// # Lifecycle
///
/// - [`start()`](Self::start) spawns the worker thread. Idempotent.
/// - [`stop()`](Self::stop) stops and joins the worker. Idempotent.
///   Messages still queued are discarded, not flushed.
///
/// `post` works in either state. `post_async` queues in either state; the
/// queue is only drained while running. Dropping the bus stops it.
///
/// `Bus` is `Send + Sync`; share it with `Arc<Bus>`. A handler that keeps an
/// `Arc<Bus>` creates a reference cycle; capture a `Weak<Bus>` instead.
///
/// # Example
///
/// ```rust
/// use topicbus::{Bus, Response};
///
/// struct Trade { symbol: String, price: f64 }
/// struct RiskResult { allowed: bool }
///
/// let bus = Bus::new();
/// bus.start()?;
///
/// bus.subscribe_with_priority("trade.*", 10, |t: &Trade| {
///     Response::new(RiskResult { allowed: t.price < 1000.0 })
/// });
/// bus.subscribe("trade.*", |t: &Trade| println!("notify {}", t.symbol));
///
/// let responses = bus.post("trade.new", Trade { symbol: "AAPL".into(), price: 150.25 });
/// assert_eq!(responses.len(), 1);
/// assert!(responses[0].get::<RiskResult>().unwrap().allowed);
///
/// bus.post_async("trade.new", Trade { symbol: "MSFT".into(), price: 200.5 });
/// bus.stop()?;
/// # Ok::<(), topicbus::Error>(())
/// ```
pub struct Bus {
    config: Config,
    broker: Arc<Broker>,
    sender: RwLock<UnboundedSender<WorkerCommand>>,
    worker: Mutex<WorkerSlot>,
    worker_thread: Mutex<Option<ThreadId>>,
    running: Arc<AtomicBool>,
}

impl Bus {
    /// Create a stopped bus with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a stopped bus with the given configuration.
    pub fn with_config(config: Config) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            config,
            broker: Arc::new(Broker::new()),
            sender: RwLock::new(tx),
            worker: Mutex::new(WorkerSlot::Idle(rx)),
            worker_thread: Mutex::new(None),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register `handler` for messages of type `M` published under topics
    /// matching `pattern`, at the configured default priority.
    ///
    /// See [`topic`](crate::topic) for the pattern syntax and
    /// [`IntoResponse`] for what a handler may return.
    pub fn subscribe<M, F, R>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        M: Message,
        F: Fn(&M) -> R + Send + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.subscription(pattern).register(handler)
    }

    /// Same as [`subscribe()`](Self::subscribe) with an explicit priority.
    /// Lower values run earlier; equal priorities run in subscription order.
    pub fn subscribe_with_priority<M, F, R>(
        &self,
        pattern: &str,
        priority: i32,
        handler: F,
    ) -> SubscriptionId
    where
        M: Message,
        F: Fn(&M) -> R + Send + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.subscription(pattern).priority(priority).register(handler)
    }

    /// Start building a subscription with custom options.
    ///
    /// See [`SubscriptionBuilder`].
    pub fn subscription(&self, pattern: &str) -> SubscriptionBuilder<'_> {
        SubscriptionBuilder::new(&self.broker, pattern, self.config.default_priority())
    }

    /// Run `f` while `handler` is subscribed.
    ///
    /// The handler is unsubscribed when `f` returns or unwinds.
    pub fn with_subscription<M, F, R, T>(
        &self,
        pattern: &str,
        handler: F,
        f: impl FnOnce(SubscriptionId) -> T,
    ) -> T
    where
        M: Message,
        F: Fn(&M) -> R + Send + Sync + 'static,
        R: IntoResponse + 'static,
    {
        let guard = self.subscription(pattern).scoped(handler);
        let out = f(guard.id());
        guard.release();
        out
    }

    /// Remove a subscription.
    ///
    /// Returns `false` if `id` is unknown, which is not an error. Dispatches
    /// already running keep their snapshot and may still call the handler once.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.broker.unsubscribe(id)
    }

    /// Publish `message` and run every matching handler on this thread.
    ///
    /// Returns the valid responses in priority order. Void responses, type
    /// mismatches, and failed handlers contribute nothing; no match at all
    /// yields an empty vector.
    pub fn post<M: Message>(&self, topic: &str, message: M) -> Vec<Response> {
        let envelope = Envelope::new(topic, message);
        self.broker.record_posted(&envelope, DispatchMode::Sync);
        self.broker.dispatch(&envelope, DispatchMode::Sync)
    }

    /// Queue `message` for the worker thread and return immediately.
    ///
    /// Messages are dispatched in the global order they were queued. The
    /// queue is unbounded.
    pub fn post_async<M: Message>(&self, topic: &str, message: M) {
        let envelope = Envelope::new(topic, message);
        self.broker.record_posted(&envelope, DispatchMode::Async);
        if self
            .sender
            .read()
            .send(WorkerCommand::Dispatch(envelope))
            .is_err()
        {
            tracing::warn!(topic, "dispatch queue closed, message dropped");
            self.broker.monitors().notify(|m| m.on_messages_dropped(1));
        }
    }

    /// Spawn the worker thread if the bus is stopped.
    ///
    /// Calling `start` on a running bus, or from a handler running on the
    /// worker thread, does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the thread cannot be spawned; the bus stays
    /// stopped.
    pub fn start(&self) -> Result<()> {
        if self.on_worker_thread() {
            return Ok(());
        }

        let mut slot = self.worker.lock();
        if self.running.load(Ordering::Acquire) {
            return Ok(());
        }

        let receiver = match mem::replace(&mut *slot, WorkerSlot::Closed) {
            WorkerSlot::Idle(receiver) => receiver,
            WorkerSlot::Running(handle) => {
                // stop() was requested from the worker thread and never joined
                if let Err(e) = self.reclaim(handle, &mut slot) {
                    tracing::error!(error = %e, "previous dispatch worker failed, restarting");
                }
                match mem::replace(&mut *slot, WorkerSlot::Closed) {
                    WorkerSlot::Idle(receiver) => receiver,
                    _ => self.reopen_queue(),
                }
            }
            WorkerSlot::Closed => self.reopen_queue(),
        };

        // Held across spawn so a handler on the new thread sees its own id.
        let mut worker_thread = self.worker_thread.lock();
        self.running.store(true, Ordering::Release);
        match WorkerHandle::spawn(
            &self.config,
            receiver,
            self.broker.clone(),
            self.running.clone(),
        ) {
            Ok(handle) => {
                *worker_thread = Some(handle.thread_id());
                *slot = WorkerSlot::Running(handle);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                tracing::error!(error = %e, "failed to spawn dispatch worker");
                Err(e)
            }
        }
    }

    /// Stop the worker thread and wait for it to exit.
    ///
    /// The handler currently running on the worker finishes; every message
    /// still queued is discarded and counted through
    /// [`Monitor::on_messages_dropped`](crate::monitoring::Monitor::on_messages_dropped).
    ///
    /// When called from a handler on the worker thread, the worker exits
    /// after that handler returns and the join happens on the next `start`,
    /// `stop`, or drop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerPanicked`] if the worker died outside the
    /// per-handler isolation (for example in a monitor callback).
    pub fn stop(&self) -> Result<()> {
        if self.on_worker_thread() {
            if self.running.swap(false, Ordering::AcqRel) {
                let _ = self.sender.read().send(WorkerCommand::Shutdown);
            }
            return Ok(());
        }

        let mut slot = self.worker.lock();
        self.running.store(false, Ordering::Release);
        match mem::replace(&mut *slot, WorkerSlot::Closed) {
            WorkerSlot::Running(handle) => {
                let _ = self.sender.read().send(WorkerCommand::Shutdown);
                self.reclaim(handle, &mut slot)
            }
            other => {
                *slot = other;
                Ok(())
            }
        }
    }

    /// Returns `true` between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Number of registered subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.broker.subscriber_count()
    }

    /// Registered subscriptions in dispatch order.
    pub fn subscriptions(&self) -> Vec<SubscriptionInfo> {
        self.broker.subscriptions()
    }

    /// Observability hooks for this bus.
    pub fn monitors(&self) -> &MonitorRegistry {
        self.broker.monitors()
    }

    /// Returns the bus configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn on_worker_thread(&self) -> bool {
        *self.worker_thread.lock() == Some(thread::current().id())
    }

    fn reopen_queue(&self) -> CommandReceiver {
        let (tx, rx) = unbounded_channel();
        *self.sender.write() = tx;
        rx
    }

    /// Join the worker, discard what is left in its queue, and park the
    /// receiver in `slot`.
    fn reclaim(&self, handle: WorkerHandle, slot: &mut WorkerSlot) -> Result<()> {
        let joined = handle.join();
        *self.worker_thread.lock() = None;
        let mut exit = joined.inspect_err(|_| {
            tracing::error!("dispatch worker thread panicked, queue lost");
        })?;

        // Everything ahead of the stop's marker was posted before the stop;
        // messages behind it wait for the next start.
        let mut dropped = exit.dropped;
        if !exit.reached_marker {
            while let Ok(cmd) = exit.receiver.try_recv() {
                match cmd {
                    WorkerCommand::Dispatch(_) => dropped += 1,
                    WorkerCommand::Shutdown => break,
                }
            }
        }
        if dropped > 0 {
            tracing::warn!(dropped, "discarded queued messages on stop");
            self.broker
                .monitors()
                .notify(|m| m.on_messages_dropped(dropped));
        }
        tracing::info!(thread = %self.config.worker_thread_name(), "dispatch worker stopped");

        *slot = WorkerSlot::Idle(exit.receiver);
        if exit.panicked {
            tracing::error!("dispatch worker panicked outside a handler");
            Err(Error::WorkerPanicked)
        } else {
            Ok(())
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Bus {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .field("subscriptions", &self.subscriber_count())
            .field("monitors", self.monitors())
            .finish()
    }
}

impl Bus {
    /// Generate a Mermaid flowchart showing which handlers listen on which patterns.
    ///
    /// Patterns are shown as circles, handlers as boxes labelled with their
    /// id, message type, and priority. Patterns appear in the order they were
    /// first seen in dispatch order.
    ///
    /// # Example output
    ///
    /// ```text
    /// flowchart LR
    ///     p0(("trade.*")) --> s3["sub-3 TradeEvent p=10"]
    ///     p0 --> s5["sub-5 TradeEvent p=100"]
    ///     p1(("risk.check")) --> s4["sub-4 TradeEvent p=200"]
    /// ```
    pub fn to_mermaid(&self) -> String {
        let mut patterns: Vec<String> = Vec::new();
        let mut lines = vec!["flowchart LR".to_string()];

        for info in self.subscriptions() {
            let handler = format!(
                "s{}[\"{} {} p={}\"]",
                info.id.value(),
                info.id,
                info.message_type,
                info.priority
            );
            let line = match patterns.iter().position(|p| *p == info.pattern) {
                Some(i) => format!("    p{i} --> {handler}"),
                None => {
                    patterns.push(info.pattern.clone());
                    let i = patterns.len() - 1;
                    format!("    p{i}((\"{}\")) --> {handler}", info.pattern)
                }
            };
            lines.push(line);
        }

        lines.join("\n")
    }
}

#[cfg(feature = "serde")]
impl Bus {
    /// Export the subscription registry as JSON.
    ///
    /// A flat list in dispatch order where each entry contains `id`,
    /// `pattern`, `priority`, and `message_type` (fully qualified type name).
    /// It mirrors [`to_mermaid`](Self::to_mermaid) in a machine-readable form.
    ///
    /// # Errors
    ///
    /// Returns any serialization error produced by `serde_json`.
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    pub fn to_json(&self) -> serde_json::Result<String> {
        use serde::Serialize;

        #[derive(Serialize)]
        struct SubscriptionExport {
            id: SubscriptionId,
            pattern: String,
            priority: i32,
            message_type: &'static str,
        }

        let exports: Vec<SubscriptionExport> = self
            .subscriptions()
            .into_iter()
            .map(|info| SubscriptionExport {
                id: info.id,
                pattern: info.pattern,
                priority: info.priority,
                message_type: info.message_type.name(),
            })
            .collect();

        serde_json::to_string_pretty(&exports)
    }
}
