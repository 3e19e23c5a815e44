//! Request-scoped structured logger.
//!
//! A [`Logger`] is a handle to a `tracing` span. Fields recorded on the span
//! (method, path, request id) are printed by the subscriber on every event
//! emitted while the span is entered, so handlers log with plain `tracing`
//! macros and still get the request fields:
//!
//! ```rust
//! use apikit::{Request, Response};
//!
//! async fn handler(req: Request) -> Response {
//!     req.context().logger().in_scope(|| tracing::info!("creating user"));
//!     Response::text("ok")
//! }
//! ```
//!
//! The logger travels inside the request [`Context`](crate::Context). Nothing
//! is looked up in global state, so concurrent requests never see each
//! other's fields.

use std::future::Future;

use tracing::instrument::Instrumented;
use tracing::{Instrument, Span};

use crate::context::RequestId;

#[derive(Clone, Debug)]
pub struct Logger {
    span: Span,
}

impl Logger {
    /// Root logger for one request, carrying `method` and `path`.
    ///
    /// Request spans are ERROR level: a span is only recorded when its level
    /// passes the filter, and the fields must survive on every event that does.
    pub fn for_request(method: &http::Method, path: &str) -> Self {
        Self::from_span(tracing::error_span!("http", method = %method, path = %path))
    }

    pub fn from_span(span: Span) -> Self {
        Self { span }
    }

    /// A logger with no request fields. Events still reach the subscriber.
    pub fn detached() -> Self {
        Self::from_span(Span::none())
    }

    /// Derives a child logger that adds `request_id=<id>` to every line.
    pub fn with_request_id(&self, id: &RequestId) -> Self {
        Self::from_span(tracing::error_span!(parent: &self.span, "req", request_id = %id))
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        self.span.in_scope(f)
    }

    pub fn in_span<F: Future>(&self, fut: F) -> Instrumented<F> {
        fut.instrument(self.span.clone())
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::detached()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{capture_logs, capture_logs_at};

    #[test]
    fn request_fields_appear_on_events() {
        let (logs, _guard) = capture_logs();

        let logger = Logger::for_request(&http::Method::POST, "/users");
        logger.in_scope(|| tracing::info!("hello"));

        let out = logs.contents();
        assert!(out.contains("method=POST"), "{out}");
        assert!(out.contains("path=/users"), "{out}");
        assert!(out.contains("hello"), "{out}");
    }

    #[test]
    fn child_logger_keeps_parent_fields() {
        let (logs, _guard) = capture_logs();

        let id = RequestId::new();
        let logger = Logger::for_request(&http::Method::GET, "/").with_request_id(&id);
        logger.in_scope(|| tracing::warn!("careful"));

        let out = logs.contents();
        assert!(out.contains("method=GET"), "{out}");
        assert!(out.contains(&format!("request_id={id}")), "{out}");
    }

    #[test]
    fn request_fields_survive_a_warn_filter() {
        let (logs, _guard) = capture_logs_at(tracing::Level::WARN);

        let id = RequestId::new();
        let logger = Logger::for_request(&http::Method::DELETE, "/keys").with_request_id(&id);
        logger.in_scope(|| tracing::error!("vault sealed"));

        let out = logs.contents();
        assert!(out.contains("path=/keys"), "{out}");
        assert!(out.contains(&format!("request_id={id}")), "{out}");
    }

    #[test]
    fn detached_logger_still_logs() {
        let (logs, _guard) = capture_logs();
        Logger::detached().in_scope(|| tracing::error!("boom"));
        assert!(logs.contents().contains("boom"));
    }

    #[tokio::test]
    async fn instrumented_futures_carry_fields() {
        let (logs, _guard) = capture_logs();

        let id = RequestId::new();
        let logger = Logger::detached().with_request_id(&id);
        logger.in_span(async { tracing::info!("inside") }).await;

        assert!(logs.contents().contains(&format!("request_id={id}")));
    }
}
