//! Middleware.
//!
//! Every middleware here is a function from a handler to a handler, so a
//! chain is just nested calls, outermost first:
//!
//! ```rust
//! use std::time::Duration;
//! use apikit::middleware::{body_limit, logger, recoverer, request_id, timeout};
//! use apikit::{Request, Response};
//!
//! async fn create_user(_req: Request) -> Response { Response::text("created") }
//!
//! let app = recoverer(logger(request_id(timeout(
//!     Duration::from_secs(10),
//!     body_limit(64 * 1024, create_user),
//! ))));
//! # let _ = apikit::into_service(app);
//! ```
//!
//! That order is the usual one and is what [`Stack::wrap`] builds:
//!
//! | Layer | Adds |
//! |---|---|
//! | [`recoverer`] | panic → `500 {"error":"internal error"}` |
//! | [`logger`] | request logger in the context |
//! | [`request_id`] | `request_id` log field, `X-Request-ID` header |
//! | [`timeout`] | context deadline, `elapsed_time` log line |
//! | [`body_limit`] | body read ceiling |
//!
//! Context changes made by a layer are visible to every layer inside it and
//! to none outside it.

mod body_limit;
mod logger;
mod recover;
mod request_id;
mod timeout;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::handler::Handler;

pub use body_limit::body_limit;
pub use logger::logger;
pub use recover::recoverer;
pub use request_id::{X_REQUEST_ID, request_id};
pub use timeout::timeout;

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default request body ceiling (1 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// The standard middleware chain with its two settings.
///
/// ```rust
/// use std::time::Duration;
/// use apikit::middleware::Stack;
/// use apikit::{Request, Response};
///
/// async fn hello(_req: Request) -> Response { Response::text("hello") }
///
/// let app = Stack::new()
///     .timeout(Duration::from_secs(5))
///     .body_limit(16 * 1024)
///     .wrap(hello);
/// # let _ = apikit::into_service(app);
/// ```
#[derive(Clone, Debug)]
pub struct Stack {
    timeout: Duration,
    body_limit: usize,
}

impl Stack {
    pub fn new() -> Self {
        Self { timeout: DEFAULT_TIMEOUT, body_limit: DEFAULT_BODY_LIMIT }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn body_limit(mut self, max_bytes: usize) -> Self {
        self.body_limit = max_bytes;
        self
    }

    /// Wraps `handler` in recoverer → logger → request_id → timeout →
    /// body_limit.
    pub fn wrap(self, handler: impl Handler) -> impl Handler {
        recoverer(logger(request_id(timeout(
            self.timeout,
            body_limit(self.body_limit, handler),
        ))))
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

/// File-friendly form of [`Stack`]'s settings, for hosts that embed it in
/// their own configuration. Missing keys take the defaults.
///
/// ```toml
/// [middleware]
/// timeout_secs = 10
/// body_limit_bytes = 65536
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct StackConfig {
    /// Per-request deadline in seconds.
    pub timeout_secs: u64,

    /// Request body ceiling in bytes.
    pub body_limit_bytes: usize,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            body_limit_bytes: DEFAULT_BODY_LIMIT,
        }
    }
}

impl From<StackConfig> for Stack {
    fn from(config: StackConfig) -> Self {
        Stack::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .body_limit(config.body_limit_bytes)
    }
}
