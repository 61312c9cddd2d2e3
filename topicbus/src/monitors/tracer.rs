use crate::{
    Error, Meta, SubscriptionId, SubscriptionInfo,
    monitoring::{DispatchMode, Monitor},
};

/// A monitor that logs message lifecycle to the `tracing` crate.
///
/// Provides visibility into message flow without custom code. Log levels:
/// - `trace` - message posted/dispatched/handled (high volume)
/// - `debug` - subscriptions added and removed
/// - `warn` - handler failures, discarded messages
/// - `info` - worker started/stopped
///
/// # Example
///
/// ```rust
/// use topicbus::{Bus, monitors::Tracer};
///
/// let bus = Bus::new();
/// bus.monitors().add(Tracer);
/// ```
#[derive(Debug)]
pub struct Tracer;

impl Monitor for Tracer {
    fn on_subscribed(&self, info: &SubscriptionInfo) {
        tracing::debug!(
            subscription = %info.id,
            pattern = %info.pattern,
            priority = info.priority,
            message_type = %info.message_type,
            "subscribed"
        );
    }

    fn on_unsubscribed(&self, id: SubscriptionId) {
        tracing::debug!(subscription = %id, "unsubscribed");
    }

    fn on_posted(&self, meta: &Meta, mode: DispatchMode) {
        tracing::trace!(
            message_id = %meta.id(),
            topic = %meta.topic(),
            message_type = %meta.message_type(),
            mode = %mode,
            "message posted"
        );
    }

    fn on_dispatched(&self, meta: &Meta, matched: usize, mode: DispatchMode) {
        tracing::trace!(
            message_id = %meta.id(),
            topic = %meta.topic(),
            matched,
            mode = %mode,
            "message dispatched"
        );
    }

    fn on_handled(&self, meta: &Meta, id: SubscriptionId, mode: DispatchMode) {
        tracing::trace!(
            message_id = %meta.id(),
            subscription = %id,
            mode = %mode,
            "message handled"
        );
    }

    fn on_handler_failed(
        &self,
        meta: &Meta,
        id: SubscriptionId,
        error: &Error,
        mode: DispatchMode,
    ) {
        tracing::warn!(
            message_id = %meta.id(),
            topic = %meta.topic(),
            subscription = %id,
            mode = %mode,
            error = %error,
            "handler failed"
        );
    }

    fn on_messages_dropped(&self, count: usize) {
        tracing::warn!(count, "queued messages dropped");
    }

    fn on_worker_started(&self) {
        tracing::info!("worker started");
    }

    fn on_worker_stopped(&self) {
        tracing::info!("worker stopped");
    }
}
