use crate::handler::Handler;
use crate::logger::Logger;
use crate::request::Request;

/// Attaches a request [`Logger`] (span `http` with `method` and `path`) to
/// the context and runs `next` inside its span.
pub fn logger(next: impl Handler) -> impl Handler {
    let next = next.into_boxed_handler();
    move |mut req: Request| {
        let logger = Logger::for_request(req.method(), req.path());
        req.map_context(|ctx| ctx.with_logger(logger.clone()));
        logger.in_span(next.call(req))
    }
}
