use std::sync::Arc;

/// The single error type for all topicbus operations.
///
/// Every fallible API returns `topicbus::Result<T>` (alias for
/// `Result<T, topicbus::Error>`). Handler failures are also expressed as
/// this type when they are reported to a [`Monitor`](crate::monitoring::Monitor),
/// even though they never reach the publisher.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("Handler failed: {0}")]
    Handler(#[source] Arc<dyn std::error::Error + Send + Sync>),

    #[error("Handler panicked: {0}")]
    HandlerPanicked(String),

    #[error("IO error: {0}")]
    Io(#[source] Arc<std::io::Error>),

    #[error("Dispatch worker panicked")]
    WorkerPanicked,
}

impl Error {
    /// Wrap an arbitrary error returned from a handler.
    pub fn handler(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Handler(Arc::new(e))
    }

    /// Build a [`Error::HandlerPanicked`] from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Error::HandlerPanicked(msg)
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Handler(a), Self::Handler(b)) => Arc::ptr_eq(a, b),
            (Self::HandlerPanicked(a), Self::HandlerPanicked(b)) => a == b,
            (Self::Io(a), Self::Io(b)) => Arc::ptr_eq(a, b),
            (Self::WorkerPanicked, Self::WorkerPanicked) => true,
            _ => false,
        }
    }
}

impl Eq for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(Arc::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payload_is_stringified() {
        let e = Error::from_panic(Box::new("boom"));
        assert_eq!(e, Error::HandlerPanicked("boom".into()));

        let e = Error::from_panic(Box::new(String::from("owned boom")));
        assert_eq!(e.to_string(), "Handler panicked: owned boom");

        let e = Error::from_panic(Box::new(42_u8));
        assert_eq!(e, Error::HandlerPanicked("non-string panic payload".into()));
    }

    #[test]
    fn handler_errors_compare_by_identity() {
        let io = std::io::Error::other("disk");
        let a = Error::handler(io);
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, Error::handler(std::io::Error::other("disk")));
        assert!(a.to_string().contains("disk"));
    }
}
