/// Runtime configuration for a [`Bus`](crate::Bus).
///
/// Controls how the asynchronous dispatch worker is spawned and the priority
/// used by [`Bus::subscribe`](crate::Bus::subscribe). Use the builder pattern
/// to customize, or use [`Default`] for sensible defaults.
///
/// # Examples
///
/// ```rust
/// use topicbus::Config;
///
/// let config = Config::default()
///     .with_worker_thread_name("orders-bus")   // visible in debuggers and panics
///     .with_worker_stack_size(256 * 1024)
///     .with_default_priority(100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Name given to the dispatch worker thread.
    /// Default: `"topicbus-worker"`
    worker_thread_name: String,

    /// Stack size for the dispatch worker thread, in bytes.
    /// `None` uses the platform default for spawned threads.
    /// Default: `None`
    worker_stack_size: Option<usize>,

    /// Priority assigned by [`Bus::subscribe`](crate::Bus::subscribe).
    /// Lower values are dispatched first.
    /// Default: 0
    default_priority: i32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            worker_thread_name: "topicbus-worker".to_string(),
            worker_stack_size: None,
            default_priority: 0,
        }
    }
}

impl Config {
    /// Set the name of the dispatch worker thread.
    pub fn with_worker_thread_name(mut self, name: impl Into<String>) -> Self {
        self.worker_thread_name = name.into();
        self
    }

    /// Returns the name of the dispatch worker thread.
    pub fn worker_thread_name(&self) -> &str {
        &self.worker_thread_name
    }

    /// Set the stack size of the dispatch worker thread.
    ///
    /// Handlers run on this thread for every [`post_async`](crate::Bus::post_async),
    /// so deep recursion in a handler may need a larger stack.
    pub fn with_worker_stack_size(mut self, bytes: usize) -> Self {
        self.worker_stack_size = Some(bytes);
        self
    }

    /// Returns the configured worker stack size, if any.
    pub fn worker_stack_size(&self) -> Option<usize> {
        self.worker_stack_size
    }

    /// Set the priority used by [`Bus::subscribe`](crate::Bus::subscribe).
    pub fn with_default_priority(mut self, priority: i32) -> Self {
        self.default_priority = priority;
        self
    }

    /// Returns the priority used by [`Bus::subscribe`](crate::Bus::subscribe).
    pub fn default_priority(&self) -> i32 {
        self.default_priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.worker_thread_name(), "topicbus-worker");
        assert_eq!(config.worker_stack_size(), None);
        assert_eq!(config.default_priority(), 0);
    }

    #[test]
    fn builder_overrides() {
        let config = Config::default()
            .with_worker_thread_name("custom")
            .with_worker_stack_size(1 << 20)
            .with_default_priority(-5);
        assert_eq!(config.worker_thread_name(), "custom");
        assert_eq!(config.worker_stack_size(), Some(1 << 20));
        assert_eq!(config.default_priority(), -5);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        let config = Config::default().with_default_priority(3);
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
