use std::{any::Any, fmt, sync::Arc};

use crate::{Error, Message, MessageType, Result};

/// Value returned by a handler to the publisher of a synchronous
/// [`post`](crate::Bus::post).
///
/// A response is either *void* (the handler ran but has nothing to say) or
/// carries a typed value. Void responses are filtered out of `post` results;
/// a failing handler produces no response at all.
///
/// ```rust
/// use topicbus::Response;
///
/// struct RiskResult { allowed: bool }
///
/// let r = Response::new(RiskResult { allowed: true });
/// assert!(r.is_valid());
/// assert!(r.get::<RiskResult>().unwrap().allowed);
/// assert!(!Response::void().is_valid());
/// ```
#[derive(Clone, Default)]
pub struct Response {
    value: Option<(Arc<dyn Any + Send + Sync>, MessageType)>,
}

impl Response {
    /// A response carrying `value`.
    pub fn new<R: Message>(value: R) -> Self {
        Self {
            value: Some((Arc::new(value), MessageType::of::<R>())),
        }
    }

    /// The "no response" outcome.
    pub fn void() -> Self {
        Self { value: None }
    }

    /// `false` for [`Response::void`].
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    /// Returns `true` if this response carries an `R`.
    pub fn is<R: Message>(&self) -> bool {
        self.value_type() == Some(MessageType::of::<R>())
    }

    /// Borrow the carried value as `R`.
    ///
    /// `None` for void responses and for responses of another type.
    pub fn get<R: Message>(&self) -> Option<&R> {
        let (value, ty) = self.value.as_ref()?;
        if *ty != MessageType::of::<R>() {
            return None;
        }
        value.downcast_ref::<R>()
    }

    /// Take shared ownership of the carried value as `R`.
    pub fn downcast<R: Message>(self) -> Option<Arc<R>> {
        let (value, _) = self.value?;
        value.downcast::<R>().ok()
    }

    /// Runtime type of the carried value, if any.
    pub fn value_type(&self) -> Option<MessageType> {
        self.value.as_ref().map(|(_, ty)| *ty)
    }

    /// Fully qualified type name of the carried value, for diagnostics.
    pub fn type_name(&self) -> Option<&'static str> {
        self.value_type().map(|ty| ty.name())
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value_type() {
            Some(ty) => write!(f, "Response({ty:?})"),
            None => f.write_str("Response(void)"),
        }
    }
}

/// Conversion from a handler's return value into a dispatch outcome.
///
/// Handlers registered with [`Bus::subscribe`](crate::Bus::subscribe) may
/// return anything implementing this trait:
///
/// | Return type | Outcome |
/// |-------------|---------|
/// | `()` | void response |
/// | [`Response`] | that response |
/// | `Option<Response>` | `None` is void |
/// | `Result<T: IntoResponse, E>` | `Err` is a handler failure |
///
/// The error type of a `Result` can be anything convertible into
/// `Box<dyn Error + Send + Sync>`: custom error types, `String`, or `&str`.
pub trait IntoResponse {
    fn into_response(self) -> Result<Response>;
}

impl IntoResponse for () {
    fn into_response(self) -> Result<Response> {
        Ok(Response::void())
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> Result<Response> {
        Ok(self)
    }
}

impl IntoResponse for Option<Response> {
    fn into_response(self) -> Result<Response> {
        Ok(self.unwrap_or_default())
    }
}

impl<T, E> IntoResponse for std::result::Result<T, E>
where
    T: IntoResponse,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn into_response(self) -> Result<Response> {
        match self {
            Ok(value) => value.into_response(),
            Err(e) => {
                let boxed: Box<dyn std::error::Error + Send + Sync> = e.into();
                Err(Error::Handler(Arc::from(boxed)))
            }
        }
    }
}
