use std::{fmt, sync::Arc};

use crate::{SubscriptionId, SubscriptionInfo, TopicPattern, internal::Handler};

/// A registry entry. Cheap to clone: snapshots copy these, not the handlers.
#[derive(Clone)]
pub(crate) struct Subscription {
    pub(crate) id: SubscriptionId,
    pub(crate) pattern: Arc<TopicPattern>,
    pub(crate) priority: i32,
    pub(crate) handler: Arc<dyn Handler>,
}

impl Subscription {
    pub(crate) fn new(pattern: TopicPattern, priority: i32, handler: Arc<dyn Handler>) -> Self {
        Self {
            id: SubscriptionId::next(),
            pattern: Arc::new(pattern),
            priority,
            handler,
        }
    }

    pub(crate) fn info(&self) -> SubscriptionInfo {
        SubscriptionInfo {
            id: self.id,
            pattern: self.pattern.to_string(),
            priority: self.priority,
            message_type: self.handler.message_type(),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("pattern", &self.pattern)
            .field("priority", &self.priority)
            .field("message_type", &self.handler.message_type())
            .finish()
    }
}
