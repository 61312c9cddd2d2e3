use std::fmt;

/// Marker that turns a pattern into a prefix match when it is the last character.
pub const WILDCARD: char = '*';

/// Parsed form of a subscription pattern.
///
/// Patterns are plain strings with at most one *trailing* wildcard:
///
/// | Pattern | Matches |
/// |---------|---------|
/// | `"*"` | every topic, including `""` |
/// | `"trade.*"` | any topic starting with `"trade."` |
/// | `"trade.new"` | exactly `"trade.new"` |
///
/// A `*` anywhere but the last position is an ordinary character: `"a*.b"`
/// only matches the literal topic `"a*.b"`. There is no multi-segment or
/// mid-pattern globbing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TopicPattern {
    /// `"*"`
    Any,
    /// Pattern ending in `*`; holds the text before the marker.
    Prefix(String),
    Exact(String),
}

impl TopicPattern {
    pub fn parse(pattern: &str) -> Self {
        if pattern.len() == WILDCARD.len_utf8() && pattern.ends_with(WILDCARD) {
            TopicPattern::Any
        } else if let Some(prefix) = pattern.strip_suffix(WILDCARD) {
            TopicPattern::Prefix(prefix.to_string())
        } else {
            TopicPattern::Exact(pattern.to_string())
        }
    }

    /// Decide whether `topic` is covered by this pattern.
    #[inline]
    pub fn matches(&self, topic: &str) -> bool {
        match self {
            TopicPattern::Any => true,
            TopicPattern::Prefix(prefix) => topic.starts_with(prefix.as_str()),
            TopicPattern::Exact(exact) => exact == topic,
        }
    }
}

impl From<&str> for TopicPattern {
    fn from(pattern: &str) -> Self {
        TopicPattern::parse(pattern)
    }
}

impl fmt::Display for TopicPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicPattern::Any => write!(f, "{WILDCARD}"),
            TopicPattern::Prefix(prefix) => write!(f, "{prefix}{WILDCARD}"),
            TopicPattern::Exact(exact) => f.write_str(exact),
        }
    }
}

/// Decide whether the subscription `pattern` matches the concrete `topic`.
///
/// Shorthand for `TopicPattern::parse(pattern).matches(topic)`.
///
/// ```rust
/// use topicbus::topic::matches;
///
/// assert!(matches("trade.*", "trade.stocks"));
/// assert!(!matches("trade.*", "other.x"));
/// assert!(matches("*", ""));
/// ```
pub fn matches(pattern: &str, topic: &str) -> bool {
    TopicPattern::parse(pattern).matches(topic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_everything() {
        assert!(matches("*", "trade.stocks"));
        assert!(matches("*", "x"));
        assert!(matches("*", ""));
        assert_eq!(TopicPattern::parse("*"), TopicPattern::Any);
    }

    #[test]
    fn trailing_wildcard_is_prefix_match() {
        assert!(matches("trade.*", "trade.stocks"));
        assert!(matches("trade.*", "trade."));
        assert!(matches("trade.*", "trade.stocks.eu"));
        assert!(!matches("trade.*", "other.x"));
        assert!(!matches("trade.*", "trade"));
        assert!(!matches("trade.*", "tr"));
        assert!(!matches("trade.*", ""));
    }

    #[test]
    fn exact_match() {
        assert!(matches("x.y", "x.y"));
        assert!(!matches("x.y", "x.y.z"));
        assert!(!matches("x.y", "x"));
        assert!(matches("", ""));
        assert!(!matches("", "x"));
    }

    #[test]
    fn inner_wildcard_is_literal() {
        assert_eq!(TopicPattern::parse("a*.b"), TopicPattern::Exact("a*.b".into()));
        assert!(matches("a*.b", "a*.b"));
        assert!(!matches("a*.b", "ax.b"));
    }

    #[test]
    fn double_star_keeps_one_literal_star() {
        assert_eq!(TopicPattern::parse("**"), TopicPattern::Prefix("*".into()));
        assert!(matches("**", "*anything"));
        assert!(!matches("**", "anything"));
    }

    #[test]
    fn multibyte_topics_do_not_panic() {
        assert!(matches("行情.*", "行情.股票"));
        assert!(!matches("行情.*", "行"));
    }

    #[test]
    fn display_round_trips_pattern_text() {
        for p in ["*", "trade.*", "x.y", "a*.b", ""] {
            assert_eq!(TopicPattern::parse(p).to_string(), p);
        }
    }
}
