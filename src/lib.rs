//! # apikit
//!
//! Middleware and JSON response helpers for HTTP APIs served by hyper.
//! Bring your own router and your own server loop.
//!
//! ## What's in the box
//!
//! - [`middleware`]: panic recovery, request logger, request id, deadline,
//!   body ceiling, and [`Stack`](middleware::Stack) to apply them in order
//! - [`reply`]: the two wire shapes: your payload as JSON, or
//!   `{"error": "..."}`
//! - [`classify`]: error value → status + safe message, with a 500 default
//!   that logs the detail and hides it from the client
//! - [`Context`]: per-request logger, request id, and deadline, replaced
//!   (never mutated) as the request moves inward
//! - `testing` (feature `test-util`): log capture and request builders for
//!   handler tests
//!
//! ## Quick start
//!
//! ```rust
//! use apikit::classify::{verify_error, VerifyError};
//! use apikit::middleware::Stack;
//! use apikit::{reply, Request, Response};
//! use http::StatusCode;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct SignedMessage { public_key: String, body: String }
//!
//! #[derive(Serialize)]
//! struct Accepted { length: usize }
//!
//! async fn submit(mut req: Request) -> Response {
//!     let msg: SignedMessage = match req.json().await {
//!         Ok(msg) => msg,
//!         Err(err) => return verify_error(req.context(), &err),
//!     };
//!     if msg.public_key.is_empty() {
//!         return verify_error(req.context(), &VerifyError::InvalidPublicKey);
//!     }
//!     reply::ok(StatusCode::CREATED, &Accepted { length: msg.body.len() })
//! }
//!
//! let service = apikit::into_service(Stack::new().wrap(submit));
//! # let _ = service;
//! ```

mod body;
mod context;
mod error;
mod handler;
mod logger;
mod request;
mod response;
mod service;

pub mod classify;
pub mod middleware;
pub mod reply;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use body::Body;
pub use context::{Context, RequestId};
pub use error::{BodyError, BoxError, ContextError};
pub use handler::Handler;
pub use logger::Logger;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use service::{HandlerService, into_service};
