use parking_lot::RwLock;

use crate::{SubscriptionId, SubscriptionInfo, internal::Subscription};

/// Live subscriptions, kept sorted by ascending priority.
///
/// Equal priorities keep insertion order, which makes the list equivalent to
/// a stable sort by priority after every insert.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    subscriptions: RwLock<Vec<Subscription>>,
}

impl Registry {
    pub(crate) fn insert(&self, subscription: Subscription) {
        let mut subscriptions = self.subscriptions.write();
        let at = subscriptions.partition_point(|s| s.priority <= subscription.priority);
        subscriptions.insert(at, subscription);
    }

    /// Remove every entry with `id`. Returns `true` if anything was removed.
    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        subscriptions.len() != before
    }

    /// Copy the subscriptions matching `topic`, in dispatch order.
    ///
    /// The lock is held only for the copy. Handlers run against the returned
    /// list, so they may subscribe or unsubscribe without deadlocking, and
    /// their changes only affect later snapshots.
    pub(crate) fn snapshot(&self, topic: &str) -> Vec<Subscription> {
        self.subscriptions
            .read()
            .iter()
            .filter(|s| s.pattern.matches(topic))
            .cloned()
            .collect()
    }

    pub(crate) fn infos(&self) -> Vec<SubscriptionInfo> {
        self.subscriptions.read().iter().map(Subscription::info).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.subscriptions.read().len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{TopicPattern, internal::TypedHandler};

    fn sub(pattern: &str, priority: i32) -> Subscription {
        Subscription::new(
            TopicPattern::parse(pattern),
            priority,
            Arc::new(TypedHandler::new(|_: &u32| ())),
        )
    }

    fn ids(subs: &[Subscription]) -> Vec<SubscriptionId> {
        subs.iter().map(|s| s.id).collect()
    }

    #[test]
    fn snapshot_is_priority_ordered_and_stable() {
        let registry = Registry::default();
        let late = sub("x.y", 100);
        let first = sub("x.y", 10);
        let tie_a = sub("x.*", 50);
        let tie_b = sub("*", 50);
        for s in [&late, &first, &tie_a, &tie_b] {
            registry.insert(s.clone());
        }

        assert_eq!(
            ids(&registry.snapshot("x.y")),
            vec![first.id, tie_a.id, tie_b.id, late.id]
        );
    }

    #[test]
    fn snapshot_filters_by_pattern() {
        let registry = Registry::default();
        let trade = sub("trade.*", 0);
        let other = sub("other.*", 0);
        registry.insert(trade.clone());
        registry.insert(other.clone());

        assert_eq!(ids(&registry.snapshot("trade.stocks")), vec![trade.id]);
        assert!(registry.snapshot("unrelated").is_empty());
    }

    #[test]
    fn remove_unknown_is_noop() {
        let registry = Registry::default();
        let s = sub("a", 0);
        registry.insert(s.clone());
        assert!(!registry.remove(SubscriptionId::next()));
        assert_eq!(registry.len(), 1);
        assert!(registry.remove(s.id));
        assert!(!registry.remove(s.id));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn snapshot_is_isolated_from_later_changes() {
        let registry = Registry::default();
        let s = sub("a", 0);
        registry.insert(s.clone());
        let snapshot = registry.snapshot("a");
        registry.remove(s.id);
        registry.insert(sub("a", 0));
        assert_eq!(ids(&snapshot), vec![s.id]);
    }

    #[test]
    fn infos_describe_entries() {
        let registry = Registry::default();
        let s = sub("trade.*", 7);
        registry.insert(s.clone());
        let info = &registry.infos()[0];
        assert_eq!(info.id, s.id);
        assert_eq!(info.pattern, "trade.*");
        assert_eq!(info.priority, 7);
        assert_eq!(info.message_type.short_name(), "u32");
    }
}
