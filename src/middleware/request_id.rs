use std::sync::Arc;

use http::HeaderValue;
use http::header::HeaderName;

use crate::context::RequestId;
use crate::handler::Handler;
use crate::request::Request;
use crate::response::Response;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Tags the request with a fresh [`RequestId`].
///
/// The id is stored in the context, added as `request_id` to the request
/// logger (so every line logged further in carries it), and returned to the
/// client in the `X-Request-ID` header. Under a
/// [`recoverer`](super::recoverer) the header and the request fields survive
/// a panic too.
pub fn request_id(next: impl Handler) -> impl Handler {
    let next = next.into_boxed_handler();
    move |mut req: Request| {
        let next = Arc::clone(&next);
        async move {
            let id = RequestId::new();
            req.map_context(|ctx| {
                let logger = ctx.logger().with_request_id(&id);
                ctx.with_logger(logger).with_request_id(id)
            });
            let logger = req.context().logger();
            if let Some(scope) = req.context().panic_scope() {
                scope.record(id, logger.clone());
            }

            let mut res = logger.in_span(next.call(req)).await;
            set_header(&mut res, id);
            res
        }
    }
}

pub(super) fn set_header(res: &mut Response, id: RequestId) {
    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        res.headers_mut().insert(X_REQUEST_ID, value);
    }
}
