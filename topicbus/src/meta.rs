use std::{fmt, sync::Arc, time::SystemTime};

use crate::{MessageId, MessageType};

/// Metadata attached to every [`Envelope`](crate::Envelope).
///
/// - `id`: unique message identifier (UUID v4, not monotonic).
/// - `timestamp`: publish time in nanoseconds since Unix epoch (`u64`).
/// - `topic`: the concrete topic the message was published under.
/// - `message_type`: runtime type tag of the payload.
///
/// This is everything a [`Monitor`](crate::monitoring::Monitor) can see about
/// a message; the payload itself stays opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    id: MessageId,
    timestamp: u64,
    topic: Arc<str>,
    message_type: MessageType,
}

impl Meta {
    pub(crate) fn new(topic: &str, message_type: MessageType) -> Self {
        Self {
            id: MessageId::new(),
            timestamp: SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default(),
            topic: Arc::from(topic),
            message_type,
        }
    }

    /// Unique identifier for this message.
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Timestamp in nanoseconds since Unix epoch (u64 truncation).
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Topic the message was published under.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Message Meta {{ id: {}, timestamp: {}, topic: {}, type: {} }}",
            self.id, self.timestamp, self.topic, self.message_type,
        )
    }
}
