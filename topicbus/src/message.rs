use std::{
    any::{TypeId, type_name},
    fmt, hash,
};

/// Marker trait for values published on a [`Bus`](crate::Bus).
///
/// Blanket-implemented for every `Send + Sync + 'static` type, so any plain
/// struct or enum can be posted without further ceremony. Messages must be:
/// - `Send + Sync` because one published value is shared by every matching
///   handler and may cross to the dispatch worker thread
/// - `'static` because it is type-erased and tagged with its [`TypeId`]
///
/// # Example
///
/// ```rust
/// use topicbus::Bus;
///
/// struct TradeEvent {
///     symbol: String,
///     price: f64,
/// }
///
/// let bus = Bus::new();
/// bus.post("trade.new", TradeEvent { symbol: "AAPL".into(), price: 150.25 });
/// ```
pub trait Message: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Message for T {}

/// Runtime type tag carried by every [`Envelope`](crate::Envelope) and
/// every registered handler.
///
/// Dispatch compares the two tags before touching the payload; a handler is
/// invoked only when they are equal.
#[derive(Clone, Copy)]
pub struct MessageType {
    id: TypeId,
    name: &'static str,
}

impl MessageType {
    /// Returns the tag for `M`.
    #[inline]
    pub fn of<M: Message>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: type_name::<M>(),
        }
    }

    /// The fully qualified Rust type name, for diagnostics only.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The unqualified type name (`TradeEvent` rather than `app::events::TradeEvent`).
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageType {}

impl hash::Hash for MessageType {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Trade;
    struct Quote;

    #[test]
    fn tags_compare_by_type() {
        assert_eq!(MessageType::of::<Trade>(), MessageType::of::<Trade>());
        assert_ne!(MessageType::of::<Trade>(), MessageType::of::<Quote>());
    }

    #[test]
    fn short_name_strips_module_path() {
        assert_eq!(MessageType::of::<Trade>().short_name(), "Trade");
        assert_eq!(MessageType::of::<Vec<u8>>().short_name(), "Vec");
        assert_eq!(MessageType::of::<u32>().to_string(), "u32");
        assert!(MessageType::of::<Trade>().name().ends_with("::Trade"));
    }
}
