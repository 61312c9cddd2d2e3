use std::{fmt, hash};
use uuid::Uuid;

/// Unique identifier assigned to every published message (UUID v4, not monotonic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, hash::Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageId(u128);

impl MessageId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().as_u128())
    }

    pub fn value(&self) -> u128 {
        self.0
    }
}

impl From<u128> for MessageId {
    fn from(value: u128) -> Self {
        MessageId(value)
    }
}

impl From<MessageId> for u128 {
    fn from(value: MessageId) -> Self {
        value.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Uuid::from_u128(self.0))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        MessageId::new()
    }
}
