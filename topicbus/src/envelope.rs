use std::{any::Any, fmt, sync::Arc};

use crate::{Message, MessageId, MessageType, Meta};

type Payload = Arc<dyn Any + Send + Sync>;

/// The unit carried through both dispatch paths.
///
/// A published value is moved into an `Envelope` exactly once, then shared
/// by reference with every matching handler (synchronous path) or moved
/// through the worker queue (asynchronous path). It pairs the type-erased
/// payload with [`Meta`] (id, timestamp, topic, type tag).
///
/// Cloning an envelope is cheap: the payload is reference counted.
#[derive(Clone)]
pub struct Envelope {
    meta: Meta,
    payload: Payload,
}

impl Envelope {
    /// Wrap `message` for publishing under `topic`.
    pub fn new<M: Message>(topic: &str, message: M) -> Self {
        Self {
            meta: Meta::new(topic, MessageType::of::<M>()),
            payload: Arc::new(message),
        }
    }

    /// Borrow the payload as `M`.
    ///
    /// Returns `None` if the envelope's type tag is not `M`. The tag is
    /// checked before the downcast.
    #[inline]
    pub fn message<M: Message>(&self) -> Option<&M> {
        if self.meta.message_type() != MessageType::of::<M>() {
            return None;
        }
        self.payload.downcast_ref::<M>()
    }

    /// Returns `true` if the payload is an `M`.
    #[inline]
    pub fn is<M: Message>(&self) -> bool {
        self.meta.message_type() == MessageType::of::<M>()
    }

    /// Returns the message metadata (id, timestamp, topic, type).
    #[inline]
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Shorthand for `self.meta().id()`.
    #[inline]
    pub fn id(&self) -> MessageId {
        self.meta.id()
    }

    /// Shorthand for `self.meta().topic()`.
    #[inline]
    pub fn topic(&self) -> &str {
        self.meta.topic()
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("id", &self.meta.id())
            .field("topic", &self.meta.topic())
            .field("type", &self.meta.message_type())
            .field("timestamp", &self.meta.timestamp())
            .finish_non_exhaustive()
    }
}
