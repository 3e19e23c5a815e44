//! JSON response envelopes.
//!
//! The wire format has exactly two shapes:
//!
//! - success: the caller's payload, serialized as-is;
//! - error: `{"error": "<message>"}`.
//!
//! Both are sent as `application/json`.
//!
//! ```rust
//! use apikit::{errorf, reply, Request, Response};
//! use http::StatusCode;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct User { id: u64 }
//!
//! async fn get_user(req: Request) -> Response {
//!     match req.path().rsplit('/').next().and_then(|id| id.parse().ok()) {
//!         Some(id) => reply::ok(StatusCode::OK, &User { id }),
//!         None => errorf!(StatusCode::BAD_REQUEST, "bad user id in {}", req.path()),
//!     }
//! }
//! ```

use std::backtrace::Backtrace;
use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::response::Response;

/// The client-visible message for every internal failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal error";

/// The error wire shape.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

/// Serializes `payload` as the JSON body at `status`.
///
/// There is no error path for the caller. A payload that fails to serialize
/// (a map with non-string keys, a failing `Serialize` impl) is logged and
/// answered with the generic 500 envelope.
pub fn ok<T: Serialize + ?Sized>(status: StatusCode, payload: &T) -> Response {
    match serde_json::to_vec(payload) {
        Ok(body) => Response::builder().status(status).json(body),
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize response payload");
            internal()
        }
    }
}

/// `{"error": message}` at `status`.
pub fn error(status: StatusCode, message: &str) -> Response {
    let body = serde_json::json!({ "error": message }).to_string();
    Response::builder().status(status).json(body)
}

/// Like [`error`], with a formatted message. See also [`errorf!`](crate::errorf).
pub fn errorf(status: StatusCode, args: fmt::Arguments<'_>) -> Response {
    match args.as_str() {
        Some(message) => error(status, message),
        None => error(status, &args.to_string()),
    }
}

/// Logs `message` with a backtrace through the request's logger and answers
/// with the generic 500 envelope. `message` never reaches the client.
pub fn internal_error(ctx: &Context, message: &str) -> Response {
    let backtrace = Backtrace::force_capture();
    ctx.logger().in_scope(|| {
        tracing::error!(stacktrace = %backtrace, "{message}");
    });
    internal()
}

pub(crate) fn internal() -> Response {
    error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
}

/// Builds an error envelope with a formatted message.
///
/// ```rust
/// # use apikit::errorf;
/// # use http::StatusCode;
/// let res = errorf!(StatusCode::FORBIDDEN, "some error {}", 1);
/// assert_eq!(&res.body()[..], br#"{"error":"some error 1"}"#);
/// ```
#[macro_export]
macro_rules! errorf {
    ($status:expr, $($arg:tt)+) => {
        $crate::reply::errorf($status, ::std::format_args!($($arg)+))
    };
}
