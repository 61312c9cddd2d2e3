use std::marker::PhantomData;

use crate::{Envelope, IntoResponse, Message, MessageType, Response, Result};

/// Type-erased callback stored in the registry.
pub(crate) trait Handler: Send + Sync {
    /// Tag of the message type this handler was registered for.
    fn message_type(&self) -> MessageType;

    /// Run the user callback.
    ///
    /// Returns `None` without running anything if the envelope carries
    /// another message type.
    fn call(&self, envelope: &Envelope) -> Option<Result<Response>>;
}

pub(crate) struct TypedHandler<M, F, R> {
    f: F,
    _types: PhantomData<fn(&M) -> R>,
}

impl<M, F, R> TypedHandler<M, F, R>
where
    M: Message,
    F: Fn(&M) -> R + Send + Sync + 'static,
    R: IntoResponse,
{
    pub(crate) fn new(f: F) -> Self {
        Self {
            f,
            _types: PhantomData,
        }
    }
}

impl<M, F, R> Handler for TypedHandler<M, F, R>
where
    M: Message,
    F: Fn(&M) -> R + Send + Sync + 'static,
    R: IntoResponse,
{
    fn message_type(&self) -> MessageType {
        MessageType::of::<M>()
    }

    fn call(&self, envelope: &Envelope) -> Option<Result<Response>> {
        let message = envelope.message::<M>()?;
        Some((self.f)(message).into_response())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    struct Ping(u32);

    #[test]
    fn mismatched_type_is_not_invoked() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let handler = TypedHandler::new(move |p: &Ping| {
            c.fetch_add(1, Ordering::SeqCst);
            Response::new(p.0 * 2)
        });

        assert!(handler.call(&Envelope::new("t", "not a ping")).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let response = handler.call(&Envelope::new("t", Ping(21))).unwrap().unwrap();
        assert_eq!(response.get::<u32>(), Some(&42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(handler.message_type(), MessageType::of::<Ping>());
    }
}
