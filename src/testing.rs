//! Helpers for testing handlers: request builders and a log sink.
//!
//! Enabled by the `test-util` feature. Add it to your dev-dependencies:
//!
//! ```toml
//! [dev-dependencies]
//! apikit = { version = "0.1", features = ["test-util"] }
//! ```
//!
//! Then test a handler directly, without a server or the middleware stack:
//!
//! ```rust,ignore
//! use apikit::testing::{call, logged_request};
//!
//! #[tokio::test]
//! async fn rejects_unsigned_messages() {
//!     let (logs, _guard, req) = logged_request(http::Method::POST, "{}");
//!     let res = call(submit, req).await;
//!     assert_eq!(res.status_code(), http::StatusCode::BAD_REQUEST);
//!     assert!(logs.contents().is_empty());
//! }
//! ```

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::Level;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

use crate::body::Body;
use crate::handler::Handler;
use crate::logger::Logger;
use crate::request::Request;
use crate::response::Response;

/// Collects everything the fmt subscriber writes.
#[derive(Clone, Default)]
pub struct LogSink(Arc<Mutex<Vec<u8>>>);

impl LogSink {
    pub fn contents(&self) -> String {
        let buf = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Routes this thread's log events, at every level, into a fresh sink until
/// the guard drops.
pub fn capture_logs() -> (LogSink, DefaultGuard) {
    capture_logs_at(Level::TRACE)
}

/// Like [`capture_logs`], with events and spans below `level` filtered out.
pub fn capture_logs_at(level: Level) -> (LogSink, DefaultGuard) {
    let sink = LogSink::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(sink.clone())
        .with_ansi(false)
        .with_max_level(level)
        .finish();
    (sink, tracing::subscriber::set_default(subscriber))
}

/// A request for `/` with an empty context.
pub fn request(method: http::Method, body: impl Into<Body>) -> Request {
    let mut req = http::Request::new(());
    *req.method_mut() = method;
    let (parts, ()) = req.into_parts();
    Request::new(parts, body.into())
}

/// A request for `/` whose context already carries a request logger, and
/// the sink that logger writes to.
pub fn logged_request(
    method: http::Method,
    body: impl Into<Body>,
) -> (LogSink, DefaultGuard, Request) {
    let (logs, guard) = capture_logs();
    let mut req = request(method, body);
    let logger = Logger::for_request(req.method(), req.path());
    req.map_context(|ctx| ctx.with_logger(logger));
    (logs, guard, req)
}

/// Runs `handler` once.
pub async fn call(handler: impl Handler, req: Request) -> Response {
    handler.into_boxed_handler().call(req).await
}

/// Parses the response body as JSON. Panics if it is not.
pub fn body_json(res: &Response) -> serde_json::Value {
    match serde_json::from_slice(res.body()) {
        Ok(value) => value,
        Err(err) => panic!("response body is not JSON: {err}"),
    }
}
