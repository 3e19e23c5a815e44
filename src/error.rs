//! Error types.
//!
//! Application-level failures (400, 401, 500, ...) are expressed as
//! [`Response`](crate::Response) values built by [`reply`](crate::reply) and
//! [`classify`](crate::classify). The types here are what a handler sees
//! *before* it decides on a response: a body read that failed, or a deadline
//! that passed.

use http_body_util::LengthLimitError;

/// Type-erased error used by request body streams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure while reading or decoding a request body.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    /// The body exceeded the ceiling installed by
    /// [`body_limit`](crate::middleware::body_limit).
    #[error("request body too large")]
    TooLarge,

    /// The underlying stream failed (client reset, protocol error, ...).
    #[error("failed to read request body: {0}")]
    Read(#[source] BoxError),

    /// The body was read but is not the JSON the handler asked for.
    #[error("invalid request body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<BoxError> for BodyError {
    fn from(err: BoxError) -> Self {
        match err.downcast::<LengthLimitError>() {
            Ok(_) => Self::TooLarge,
            Err(err) => Self::Read(err),
        }
    }
}

/// Reported by [`Context::err`](crate::Context::err) once the request's
/// context is done.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ContextError {
    #[error("deadline exceeded")]
    DeadlineExceeded,
}
