use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use crate::{
    Envelope, Error, Response, SubscriptionId, SubscriptionInfo, TopicPattern,
    internal::{Handler, Registry, Subscription},
    monitoring::{DispatchMode, MonitorRegistry},
};

/// Registry plus the dispatch boundary.
///
/// Shared by the [`Bus`](crate::Bus) facade, the async worker thread, and
/// scoped subscription guards.
#[derive(Debug)]
pub(crate) struct Broker {
    registry: Registry,
    monitors: MonitorRegistry,
}

impl Broker {
    pub(crate) fn new() -> Self {
        Self {
            registry: Registry::default(),
            monitors: MonitorRegistry::new(),
        }
    }

    pub(crate) fn monitors(&self) -> &MonitorRegistry {
        &self.monitors
    }

    pub(crate) fn subscribe(
        &self,
        pattern: &str,
        priority: i32,
        handler: Arc<dyn Handler>,
    ) -> SubscriptionId {
        let subscription = Subscription::new(TopicPattern::parse(pattern), priority, handler);
        let id = subscription.id;
        let info = subscription.info();
        self.registry.insert(subscription);

        tracing::debug!(
            subscription = %id,
            pattern = %info.pattern,
            priority,
            message_type = %info.message_type,
            "handler subscribed"
        );
        self.monitors.notify(|m| m.on_subscribed(&info));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.registry.remove(id);
        if removed {
            tracing::debug!(subscription = %id, "handler unsubscribed");
            self.monitors.notify(|m| m.on_unsubscribed(id));
        }
        removed
    }

    pub(crate) fn subscriptions(&self) -> Vec<SubscriptionInfo> {
        self.registry.infos()
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    pub(crate) fn record_posted(&self, envelope: &Envelope, mode: DispatchMode) {
        self.monitors.notify(|m| m.on_posted(envelope.meta(), mode));
    }

    /// Run every handler matching the envelope's topic and type, in priority order.
    ///
    /// Handler errors and panics are caught here, logged, and forwarded to
    /// monitors; they never reach the caller. Valid responses are collected
    /// for [`DispatchMode::Sync`] and discarded for [`DispatchMode::Async`].
    pub(crate) fn dispatch(&self, envelope: &Envelope, mode: DispatchMode) -> Vec<Response> {
        let message_type = envelope.meta().message_type();
        let targets: Vec<Subscription> = self
            .registry
            .snapshot(envelope.topic())
            .into_iter()
            .filter(|s| s.handler.message_type() == message_type)
            .collect();

        self.monitors
            .notify(|m| m.on_dispatched(envelope.meta(), targets.len(), mode));

        let mut responses = Vec::new();
        for subscription in &targets {
            let outcome = catch_unwind(AssertUnwindSafe(|| subscription.handler.call(envelope)));
            let result = match outcome {
                Ok(Some(result)) => result,
                Ok(None) => continue,
                Err(payload) => Err(Error::from_panic(payload)),
            };

            match result {
                Ok(response) => {
                    self.monitors
                        .notify(|m| m.on_handled(envelope.meta(), subscription.id, mode));
                    if mode == DispatchMode::Sync && response.is_valid() {
                        responses.push(response);
                    }
                }
                Err(e) => self.record_failure(envelope, subscription.id, &e, mode),
            }
        }
        responses
    }

    fn record_failure(
        &self,
        envelope: &Envelope,
        id: SubscriptionId,
        error: &Error,
        mode: DispatchMode,
    ) {
        tracing::warn!(
            subscription = %id,
            message_id = %envelope.id(),
            topic = %envelope.topic(),
            mode = %mode,
            error = %error,
            "handler failed"
        );
        self.monitors
            .notify(|m| m.on_handler_failed(envelope.meta(), id, error, mode));
    }
}
