use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::handler::Handler;
use crate::request::Request;

/// Arms a deadline `limit` from now on the request context, then logs the
/// handler's `elapsed_time` once it returns.
///
/// Cancellation is cooperative. Handlers observe the deadline through
/// [`Context::done`](crate::Context::done) and
/// [`Context::err`](crate::Context::err); a handler that ignores it runs to
/// completion and its full elapsed time is logged.
pub fn timeout(limit: Duration, next: impl Handler) -> impl Handler {
    let next = next.into_boxed_handler();
    move |mut req: Request| {
        let next = Arc::clone(&next);
        async move {
            let started = Instant::now();
            req.map_context(|ctx| ctx.with_timeout(limit));
            let logger = req.context().logger();

            let res = next.call(req).await;

            let elapsed = started.elapsed();
            logger.in_scope(|| tracing::info!(elapsed_time = ?elapsed, "request handled"));
            res
        }
    }
}
