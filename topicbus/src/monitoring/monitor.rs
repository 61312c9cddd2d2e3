use crate::{Error, Meta, SubscriptionId, SubscriptionInfo, monitoring::DispatchMode};

/// Trait for observing message flow through a bus.
///
/// Implement this trait to receive callbacks during lifecycle stages.
/// All methods have default no-op implementations, so you only need to
/// override the ones you care about.
///
/// Callbacks run synchronously on the thread that triggers them: the
/// publisher's thread for [`Bus::post`](crate::Bus::post), the worker thread
/// for [`Bus::post_async`](crate::Bus::post_async). Keep them short. A
/// monitor that panics is removed from the registry.
///
/// # Message Lifecycle
///
/// 1. **Posted**  - `post`/`post_async` accepted the message
/// 2. **Dispatched**  - a snapshot of matching subscriptions was taken
/// 3. **Handled** or **Failed**  - once per matching handler of the right type
///
/// For a single message matched by N handlers, step 3 fires N times.
/// Handlers skipped because of a type mismatch fire nothing.
pub trait Monitor: Send + Sync {
    /// Called when a handler is added to the registry.
    fn on_subscribed(&self, info: &SubscriptionInfo) {
        let _i = info;
    }

    /// Called when [`Bus::unsubscribe`](crate::Bus::unsubscribe) removed a handler.
    fn on_unsubscribed(&self, id: SubscriptionId) {
        let _i = id;
    }

    /// Called when a message enters the bus.
    ///
    /// For the async path this fires on the publisher's thread at enqueue time.
    fn on_posted(&self, meta: &Meta, mode: DispatchMode) {
        let _m = meta;
        let _d = mode;
    }

    /// Called once the matching subscriptions for a message are known,
    /// just before the first handler runs.
    fn on_dispatched(&self, meta: &Meta, matched: usize, mode: DispatchMode) {
        let _m = meta;
        let _n = matched;
        let _d = mode;
    }

    /// Called after a handler returned successfully.
    fn on_handled(&self, meta: &Meta, id: SubscriptionId, mode: DispatchMode) {
        let _m = meta;
        let _i = id;
        let _d = mode;
    }

    /// Called when a handler returned an error or panicked.
    ///
    /// The failure is contained: remaining handlers still run and the
    /// publisher never sees it.
    fn on_handler_failed(
        &self,
        meta: &Meta,
        id: SubscriptionId,
        error: &Error,
        mode: DispatchMode,
    ) {
        let _m = meta;
        let _i = id;
        let _e = error;
        let _d = mode;
    }

    /// Called when [`Bus::stop`](crate::Bus::stop) discarded queued messages.
    fn on_messages_dropped(&self, count: usize) {
        let _c = count;
    }

    /// Called on the worker thread right after it starts.
    fn on_worker_started(&self) {}

    /// Called on the worker thread right before it exits.
    fn on_worker_stopped(&self) {}
}
