use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle, ThreadId},
};

use tokio::sync::mpsc::UnboundedReceiver;

use crate::{
    Config, Error, Result,
    internal::{Broker, WorkerCommand},
    monitoring::DispatchMode,
};

pub(crate) type CommandReceiver = UnboundedReceiver<WorkerCommand>;

/// What the worker thread hands back when it exits.
pub(crate) struct WorkerExit {
    pub(crate) receiver: CommandReceiver,
    /// Messages dequeued after shutdown was requested and not dispatched.
    pub(crate) dropped: usize,
    /// The worker consumed the `Shutdown` marker of the stop that ended it.
    pub(crate) reached_marker: bool,
    pub(crate) panicked: bool,
}

/// Drains the async queue on a dedicated thread, one message at a time.
struct Worker {
    receiver: CommandReceiver,
    broker: Arc<Broker>,
    running: Arc<AtomicBool>,
    dropped: usize,
    reached_marker: bool,
}

impl Worker {
    fn run(&mut self) {
        self.broker.monitors().notify(|m| m.on_worker_started());

        while let Some(cmd) = self.receiver.blocking_recv() {
            match cmd {
                // Left over from an earlier stop that ended a previous worker.
                WorkerCommand::Shutdown if self.running.load(Ordering::Acquire) => {}
                WorkerCommand::Shutdown => {
                    self.reached_marker = true;
                    break;
                }
                WorkerCommand::Dispatch(_) if !self.running.load(Ordering::Acquire) => {
                    self.dropped += 1;
                    break;
                }
                WorkerCommand::Dispatch(envelope) => {
                    self.broker.dispatch(&envelope, DispatchMode::Async);
                }
            }
        }

        self.broker.monitors().notify(|m| m.on_worker_stopped());
    }
}

/// Join handle of a running worker thread.
pub(crate) struct WorkerHandle {
    thread: JoinHandle<WorkerExit>,
}

impl WorkerHandle {
    /// Spawn the worker thread.
    ///
    /// On failure the receiver is lost together with the thread closure, so
    /// the caller must open a fresh queue.
    pub(crate) fn spawn(
        config: &Config,
        receiver: CommandReceiver,
        broker: Arc<Broker>,
        running: Arc<AtomicBool>,
    ) -> Result<Self> {
        let mut builder = thread::Builder::new().name(config.worker_thread_name().to_string());
        if let Some(size) = config.worker_stack_size() {
            builder = builder.stack_size(size);
        }

        let mut worker = Worker {
            receiver,
            broker,
            running,
            dropped: 0,
            reached_marker: false,
        };
        let thread = builder.spawn(move || {
            let panicked = catch_unwind(AssertUnwindSafe(|| worker.run())).is_err();
            WorkerExit {
                receiver: worker.receiver,
                dropped: worker.dropped,
                reached_marker: worker.reached_marker,
                panicked,
            }
        })?;

        tracing::info!(thread = %config.worker_thread_name(), "dispatch worker started");
        Ok(Self { thread })
    }

    pub(crate) fn thread_id(&self) -> ThreadId {
        self.thread.thread().id()
    }

    /// Wait for the worker thread to exit.
    pub(crate) fn join(self) -> Result<WorkerExit> {
        self.thread.join().map_err(|_| Error::WorkerPanicked)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use tokio::sync::mpsc::unbounded_channel;

    use super::*;
    use crate::{Envelope, internal::TypedHandler};

    #[test]
    fn dispatches_in_fifo_order_until_shutdown() {
        let broker = Arc::new(Broker::new());
        let (seen_tx, seen_rx) = mpsc::channel();
        let seen_tx = parking_lot::Mutex::new(seen_tx);
        broker.subscribe(
            "seq",
            0,
            Arc::new(TypedHandler::new(move |n: &u32| {
                let _ = seen_tx.lock().send(*n);
            })),
        );

        let (tx, rx) = unbounded_channel();
        let running = Arc::new(AtomicBool::new(true));
        let handle =
            WorkerHandle::spawn(&Config::default(), rx, broker, running.clone()).unwrap();

        for n in 0..100_u32 {
            tx.send(WorkerCommand::Dispatch(Envelope::new("seq", n))).unwrap();
        }
        let received: Vec<u32> = (0..100).map(|_| seen_rx.recv().unwrap()).collect();
        assert_eq!(received, (0..100).collect::<Vec<_>>());

        running.store(false, Ordering::Release);
        tx.send(WorkerCommand::Shutdown).unwrap();
        let exit = handle.join().unwrap();
        assert!(!exit.panicked);
        assert!(exit.reached_marker);
        assert_eq!(exit.dropped, 0);
    }

    #[test]
    fn stale_shutdown_is_ignored_while_running() {
        let broker = Arc::new(Broker::new());
        let (seen_tx, seen_rx) = mpsc::channel();
        broker.subscribe(
            "t",
            0,
            Arc::new(TypedHandler::new(move |n: &u8| {
                let _ = seen_tx.send(*n);
            })),
        );

        let (tx, rx) = unbounded_channel();
        tx.send(WorkerCommand::Shutdown).unwrap();
        tx.send(WorkerCommand::Dispatch(Envelope::new("t", 5_u8))).unwrap();

        let running = Arc::new(AtomicBool::new(true));
        let handle =
            WorkerHandle::spawn(&Config::default(), rx, broker, running.clone()).unwrap();
        assert_eq!(seen_rx.recv(), Ok(5));

        running.store(false, Ordering::Release);
        tx.send(WorkerCommand::Shutdown).unwrap();
        assert!(handle.join().unwrap().reached_marker);
    }

    #[test]
    fn stops_before_next_message_once_flag_is_cleared() {
        let broker = Arc::new(Broker::new());
        let (tx, rx) = unbounded_channel();
        let running = Arc::new(AtomicBool::new(false));

        tx.send(WorkerCommand::Dispatch(Envelope::new("t", 1_u8))).unwrap();
        tx.send(WorkerCommand::Dispatch(Envelope::new("t", 2_u8))).unwrap();

        let handle = WorkerHandle::spawn(&Config::default(), rx, broker, running).unwrap();
        let mut exit = handle.join().unwrap();
        assert_eq!(exit.dropped, 1);
        assert!(!exit.reached_marker);
        assert!(matches!(exit.receiver.try_recv(), Ok(WorkerCommand::Dispatch(_))));
    }
}
