use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::{
    Error, Meta, SubscriptionId, SubscriptionInfo,
    monitoring::{DispatchMode, Monitor},
};

/// Monitor that counts messages as they move through the bus.
///
/// Register a clone with the bus and keep another one to query. Counters
/// are shared between clones and can be read at any time from any thread.
///
/// ```rust
/// use topicbus::{Bus, monitors::DispatchStats};
///
/// let bus = Bus::new();
/// let stats = DispatchStats::new();
/// bus.monitors().add(stats.clone());
///
/// bus.subscribe("ticks", |_: &u64| ());
/// bus.post("ticks", 1_u64);
///
/// assert_eq!(stats.posted(), 1);
/// assert_eq!(stats.handled(), 1);
/// assert_eq!(stats.failed(), 0);
/// ```
#[derive(Clone, Default)]
pub struct DispatchStats {
    inner: Arc<Counters>,
}

#[derive(Default)]
struct Counters {
    subscribed: AtomicUsize,
    unsubscribed: AtomicUsize,
    posted_sync: AtomicUsize,
    posted_async: AtomicUsize,
    unmatched: AtomicUsize,
    handled: AtomicUsize,
    failed: AtomicUsize,
    dropped: AtomicUsize,
}

impl DispatchStats {
    /// Create a new `DispatchStats` with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages posted through either path.
    pub fn posted(&self) -> usize {
        self.posted_sync() + self.posted_async()
    }

    pub fn posted_sync(&self) -> usize {
        self.inner.posted_sync.load(Ordering::Relaxed)
    }

    pub fn posted_async(&self) -> usize {
        self.inner.posted_async.load(Ordering::Relaxed)
    }

    /// Messages dispatched with no handler of matching topic and type.
    pub fn unmatched(&self) -> usize {
        self.inner.unmatched.load(Ordering::Relaxed)
    }

    /// Handler invocations that returned successfully.
    pub fn handled(&self) -> usize {
        self.inner.handled.load(Ordering::Relaxed)
    }

    /// Handler invocations that returned an error or panicked.
    pub fn failed(&self) -> usize {
        self.inner.failed.load(Ordering::Relaxed)
    }

    /// Queued messages discarded by [`Bus::stop`](crate::Bus::stop).
    pub fn dropped(&self) -> usize {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    /// Subscriptions currently registered, as seen by this monitor.
    ///
    /// Only accurate if the monitor was attached before the first subscribe.
    pub fn active_subscriptions(&self) -> usize {
        let added = self.inner.subscribed.load(Ordering::Relaxed);
        let removed = self.inner.unsubscribed.load(Ordering::Relaxed);
        added.saturating_sub(removed)
    }
}

impl Monitor for DispatchStats {
    fn on_subscribed(&self, _info: &SubscriptionInfo) {
        self.inner.subscribed.fetch_add(1, Ordering::Relaxed);
    }

    fn on_unsubscribed(&self, _id: SubscriptionId) {
        self.inner.unsubscribed.fetch_add(1, Ordering::Relaxed);
    }

    fn on_posted(&self, _meta: &Meta, mode: DispatchMode) {
        let counter = match mode {
            DispatchMode::Sync => &self.inner.posted_sync,
            DispatchMode::Async => &self.inner.posted_async,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn on_dispatched(&self, _meta: &Meta, matched: usize, _mode: DispatchMode) {
        if matched == 0 {
            self.inner.unmatched.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn on_handled(&self, _meta: &Meta, _id: SubscriptionId, _mode: DispatchMode) {
        self.inner.handled.fetch_add(1, Ordering::Relaxed);
    }

    fn on_handler_failed(
        &self,
        _meta: &Meta,
        _id: SubscriptionId,
        _error: &Error,
        _mode: DispatchMode,
    ) {
        self.inner.failed.fetch_add(1, Ordering::Relaxed);
    }

    fn on_messages_dropped(&self, count: usize) {
        self.inner.dropped.fetch_add(count, Ordering::Relaxed);
    }
}

impl fmt::Debug for DispatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchStats")
            .field("posted", &self.posted())
            .field("handled", &self.handled())
            .field("failed", &self.failed())
            .field("dropped", &self.dropped())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bus;

    #[derive(Debug)]
    struct Tick(u64);

    #[test]
    fn default_is_zero() {
        let stats = DispatchStats::default();
        assert_eq!(stats.posted(), 0);
        assert_eq!(stats.handled(), 0);
        assert_eq!(stats.failed(), 0);
        assert_eq!(stats.dropped(), 0);
        assert_eq!(stats.active_subscriptions(), 0);
    }

    #[test]
    fn counts_sync_dispatch() {
        let bus = Bus::new();
        let stats = DispatchStats::new();
        bus.monitors().add(stats.clone());

        let id = bus.subscribe("tick", |_: &Tick| ());
        bus.subscribe("tick", |t: &Tick| {
            if t.0 == 0 {
                Err("zero tick")
            } else {
                Ok(())
            }
        });
        assert_eq!(stats.active_subscriptions(), 2);

        bus.post("tick", Tick(0));
        bus.post("tick", Tick(1));
        bus.post("nowhere", Tick(2));

        assert_eq!(stats.posted_sync(), 3);
        assert_eq!(stats.posted_async(), 0);
        assert_eq!(stats.handled(), 3);
        assert_eq!(stats.failed(), 1);
        assert_eq!(stats.unmatched(), 1);

        bus.unsubscribe(id);
        assert_eq!(stats.active_subscriptions(), 1);
    }

    #[test]
    fn async_posts_counted_at_enqueue() {
        let bus = Bus::new();
        let stats = DispatchStats::new();
        bus.monitors().add(stats.clone());

        bus.post_async("tick", Tick(1));
        bus.post_async("tick", Tick(2));
        assert_eq!(stats.posted_async(), 2);
        assert_eq!(stats.posted(), 2);
        assert_eq!(stats.handled(), 0);
    }

    #[test]
    fn clone_shares_state() {
        let stats = DispatchStats::new();
        let query = stats.clone();
        stats.on_messages_dropped(3);
        assert_eq!(query.dropped(), 3);
    }
}
