//! Error classification.
//!
//! Maps an error value to the response the client should see. Known kinds
//! get a status and a message that is safe to show; everything else is an
//! internal error whose detail only reaches the logs.
//!
//! Classification looks through the whole `source()` chain, so a domain error
//! that wraps a [`VerifyError`] is classified by the `VerifyError` inside it,
//! and the client sees that inner message rather than the wrapper's.
//!
//! ```rust
//! use apikit::classify::{verify_error, VerifyError};
//! use apikit::{Request, Response};
//!
//! #[derive(Debug, thiserror::Error)]
//! enum TransferError {
//!     #[error("verify transfer signature")]
//!     Signature(#[from] VerifyError),
//!     #[error("ledger unavailable")]
//!     Ledger,
//! }
//!
//! async fn transfer(req: Request) -> Response {
//!     match execute(&req) {
//!         Ok(()) => Response::text("ok"),
//!         Err(err) => verify_error(req.context(), &err),
//!     }
//! }
//!
//! fn execute(_req: &Request) -> Result<(), TransferError> {
//!     Err(VerifyError::NotVerified.into())
//! }
//! ```

use std::error::Error;
use std::iter;

use http::StatusCode;

use crate::context::Context;
use crate::error::BodyError;
use crate::reply;
use crate::response::Response;

/// Request-verification failures shared across domain crates.
///
/// The messages are part of the API: they are sent to clients verbatim.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum VerifyError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid request: public key is invalid")]
    InvalidPublicKey,

    #[error("invalid request: signature is invalid")]
    InvalidSignature,

    #[error("failed to verify message")]
    NotVerified,
}

impl VerifyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidPublicKey | Self::InvalidSignature => {
                StatusCode::BAD_REQUEST
            }
            Self::NotVerified => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Outcome of [`classify`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Classified {
    /// A known failure. `message` is safe to send to the client.
    Rejected { status: StatusCode, message: String },
    /// Anything else. Log it, answer with the generic 500.
    Internal,
}

/// Total mapping from an error to a [`Classified`] outcome.
pub fn classify(err: &(dyn Error + 'static)) -> Classified {
    for cause in iter::successors(Some(err), |&e| e.source()) {
        if let Some(err) = cause.downcast_ref::<VerifyError>() {
            return Classified::Rejected { status: err.status(), message: err.to_string() };
        }
        if let Some(err) = cause.downcast_ref::<BodyError>() {
            match err {
                BodyError::TooLarge => {
                    return Classified::Rejected {
                        status: StatusCode::PAYLOAD_TOO_LARGE,
                        message: err.to_string(),
                    };
                }
                BodyError::Decode(detail) => {
                    return Classified::Rejected {
                        status: StatusCode::BAD_REQUEST,
                        message: format!("invalid request: {detail}"),
                    };
                }
                BodyError::Read(_) => {}
            }
        }
    }
    Classified::Internal
}

/// Answers `err` with its classified envelope, or with the generic 500 after
/// logging the full error chain and a backtrace.
pub fn verify_error(ctx: &Context, err: &(dyn Error + 'static)) -> Response {
    match classify(err) {
        Classified::Rejected { status, message } => reply::error(status, &message),
        Classified::Internal => reply::internal_error(ctx, &chain(err)),
    }
}

/// `outer: inner: innermost`
fn chain(err: &(dyn Error + 'static)) -> String {
    iter::successors(Some(err), |&e| e.source())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}
