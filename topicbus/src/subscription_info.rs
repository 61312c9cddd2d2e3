use std::fmt;

use crate::{MessageType, SubscriptionId};

/// Read-only description of a registered handler.
///
/// Returned by [`Bus::subscriptions`](crate::Bus::subscriptions) in dispatch
/// order and passed to [`Monitor::on_subscribed`](crate::monitoring::Monitor::on_subscribed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionInfo {
    pub id: SubscriptionId,
    /// Pattern text as given to `subscribe`.
    pub pattern: String,
    pub priority: i32,
    /// Message type the handler accepts.
    pub message_type: MessageType,
}

impl fmt::Display for SubscriptionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} <{}> priority {}",
            self.id, self.pattern, self.message_type, self.priority
        )
    }
}
