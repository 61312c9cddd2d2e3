use std::sync::Arc;

use crate::{
    IntoResponse, Message, SubscriptionGuard, SubscriptionId,
    internal::{Broker, TypedHandler},
};

/// Builder for registering a handler with non-default options.
///
/// Returned by [`Bus::subscription`](crate::Bus::subscription). Defaults to
/// the priority configured in [`Config`](crate::Config) (0 unless changed).
///
/// # Examples
///
/// ```rust
/// use topicbus::{Bus, Response};
///
/// struct Trade { price: f64 }
/// struct RiskResult { allowed: bool }
///
/// let bus = Bus::new();
///
/// // Runs before handlers with a higher priority value
/// let id = bus
///     .subscription("trade.*")
///     .priority(-10)
///     .register(|t: &Trade| Response::new(RiskResult { allowed: t.price < 1000.0 }));
///
/// // Unsubscribed when the guard is released or dropped
/// let guard = bus.subscription("trade.*").scoped(|_: &Trade| ());
/// guard.release();
/// # bus.unsubscribe(id);
/// ```
pub struct SubscriptionBuilder<'a> {
    broker: &'a Arc<Broker>,
    pattern: String,
    priority: i32,
}

impl<'a> SubscriptionBuilder<'a> {
    pub(crate) fn new(broker: &'a Arc<Broker>, pattern: &str, priority: i32) -> Self {
        Self {
            broker,
            pattern: pattern.to_string(),
            priority,
        }
    }

    /// Set the dispatch priority. Lower values run earlier.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Register the handler and return its [`SubscriptionId`].
    ///
    /// The subscription lives until [`Bus::unsubscribe`](crate::Bus::unsubscribe).
    pub fn register<M, F, R>(self, handler: F) -> SubscriptionId
    where
        M: Message,
        F: Fn(&M) -> R + Send + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.broker.subscribe(
            &self.pattern,
            self.priority,
            Arc::new(TypedHandler::new(handler)),
        )
    }

    /// Register the handler and return a guard that unsubscribes it.
    ///
    /// See [`SubscriptionGuard`].
    pub fn scoped<M, F, R>(self, handler: F) -> SubscriptionGuard
    where
        M: Message,
        F: Fn(&M) -> R + Send + Sync + 'static,
        R: IntoResponse + 'static,
    {
        let broker = self.broker;
        let id = self.register(handler);
        SubscriptionGuard::new(id, broker)
    }
}
