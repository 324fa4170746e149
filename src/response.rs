//! HTTP response
use bytes::Bytes;
use std::fmt;

mod into_response;

/// Represents an HTTP response.
pub type Response<T = Bytes> = http::Response<T>;

/// A type that can be converted into response.
///
/// This trait is used as handler error type.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

// ===== Error Response =====

/// An [`std::error::Error`] that can be converted into response.
pub trait ErrorResponse: std::error::Error + Send + Sync + 'static {
    fn into_error_response(self: Box<Self>) -> Response;
}

impl<R> ErrorResponse for R
where
    R: std::error::Error + IntoResponse + Send + Sync + 'static,
{
    fn into_error_response(self: Box<Self>) -> Response {
        (*self).into_response()
    }
}

/// Type erased [`ErrorResponse`], returned from handlers.
///
/// Any [`ErrorResponse`] converts into it with `?`.
pub struct Error {
    inner: Box<dyn ErrorResponse>,
}

impl<E: ErrorResponse> From<E> for Error {
    fn from(value: E) -> Self {
        Self { inner: Box::new(value) }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.inner.into_error_response()
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

/// A [`Result`][std::result::Result] with [`Err`] variant of [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
