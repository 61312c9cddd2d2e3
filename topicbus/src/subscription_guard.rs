use std::{
    fmt,
    sync::{Arc, Weak},
};

use crate::{SubscriptionId, internal::Broker};

/// Owns a subscription and removes it exactly once.
///
/// Created by [`SubscriptionBuilder::scoped`](crate::SubscriptionBuilder::scoped).
/// The subscription is removed by whichever comes first:
///
/// - an explicit [`release()`](Self::release),
/// - the guard going out of scope, including early returns and unwinding.
///
/// [`detach()`](Self::detach) disarms the guard and keeps the subscription
/// registered. The guard does not keep the bus alive; releasing after the bus
/// is gone is a no-op.
///
/// ```rust
/// use topicbus::Bus;
///
/// struct Quote(f64);
///
/// let bus = Bus::new();
/// {
///     let _guard = bus.subscription("quotes").scoped(|q: &Quote| println!("{}", q.0));
///     bus.post("quotes", Quote(1.25));
/// }
/// assert_eq!(bus.subscriber_count(), 0);
/// ```
#[must_use = "dropping the guard unsubscribes the handler immediately"]
pub struct SubscriptionGuard {
    id: SubscriptionId,
    broker: Weak<Broker>,
    armed: bool,
}

impl SubscriptionGuard {
    pub(crate) fn new(id: SubscriptionId, broker: &Arc<Broker>) -> Self {
        Self {
            id,
            broker: Arc::downgrade(broker),
            armed: true,
        }
    }

    /// Id of the guarded subscription.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Unsubscribe now. Returns `true` if the handler was still registered.
    pub fn release(mut self) -> bool {
        self.release_once()
    }

    /// Keep the subscription registered and give up the guard.
    pub fn detach(mut self) -> SubscriptionId {
        self.armed = false;
        self.id
    }

    fn release_once(&mut self) -> bool {
        if !std::mem::replace(&mut self.armed, false) {
            return false;
        }
        self.broker
            .upgrade()
            .is_some_and(|broker| broker.unsubscribe(self.id))
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.release_once();
    }
}

impl fmt::Debug for SubscriptionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionGuard")
            .field("id", &self.id)
            .field("armed", &self.armed)
            .finish()
    }
}
