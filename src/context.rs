//! Per-request context.
//!
//! A [`Context`] is never mutated. Each middleware takes the current value,
//! derives a new one with one more field, and hands the new value inward via
//! [`Request::map_context`](crate::Request::map_context). Layers further in
//! see everything added above them; layers further out never see what was
//! added below.

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

use crate::error::ContextError;
use crate::logger::Logger;

/// Unique identifier assigned to a request by
/// [`request_id`](crate::middleware::request_id).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RequestId(Uuid);

impl RequestId {
    /// A fresh random (v4) id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Where [`request_id`](crate::middleware::request_id) leaves the id and
/// its logger for the [`recoverer`](crate::middleware::recoverer) above it.
///
/// Context changes never travel outward, and a panic unwinds past the layer
/// that made them, so the recoverer hands this slot inward and reads it back
/// after catching.
#[derive(Clone, Debug, Default)]
pub(crate) struct PanicScope(Arc<OnceLock<(RequestId, Logger)>>);

impl PanicScope {
    /// First writer wins: an inner `request_id` never replaces an outer one.
    pub(crate) fn record(&self, id: RequestId, logger: Logger) {
        let _ = self.0.set((id, logger));
    }

    pub(crate) fn get(&self) -> Option<&(RequestId, Logger)> {
        self.0.get()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Context {
    logger: Option<Logger>,
    request_id: Option<RequestId>,
    deadline: Option<Instant>,
    panic_scope: Option<PanicScope>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger(self, logger: Logger) -> Self {
        Self { logger: Some(logger), ..self }
    }

    pub fn with_request_id(self, id: RequestId) -> Self {
        Self { request_id: Some(id), ..self }
    }

    /// Arms a deadline `timeout` from now. An earlier deadline already on the
    /// context wins.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        };
        Self { deadline: Some(deadline), ..self }
    }

    /// The request's logger, or a detached one if the
    /// [`logger`](crate::middleware::logger) middleware is not installed.
    pub fn logger(&self) -> Logger {
        self.logger.clone().unwrap_or_default()
    }

    pub fn try_logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }

    pub fn request_id(&self) -> Option<RequestId> {
        self.request_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline. `None` without a deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Resolves once the deadline passes. Never resolves without a deadline.
    ///
    /// Handlers doing long work should race it against `done()` and return
    /// early; nothing stops a handler that doesn't.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    }

    pub(crate) fn with_panic_scope(self, scope: PanicScope) -> Self {
        Self { panic_scope: Some(scope), ..self }
    }

    pub(crate) fn panic_scope(&self) -> Option<&PanicScope> {
        self.panic_scope.as_ref()
    }

    pub fn err(&self) -> Option<ContextError> {
        self.deadline
            .filter(|d| Instant::now() >= *d)
            .map(|_| ContextError::DeadlineExceeded)
    }
}
