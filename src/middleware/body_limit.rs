use crate::handler::Handler;
use crate::request::Request;

/// Caps the request body at `max_bytes`.
///
/// Nothing is read here. The cap is enforced while the handler reads, so an
/// oversized body fails with [`BodyError::TooLarge`](crate::BodyError::TooLarge)
/// after at most `max_bytes` have been buffered, whatever the client claimed
/// in `Content-Length`. Choosing the status is left to the handler;
/// [`verify_error`](crate::classify::verify_error) answers `413`.
pub fn body_limit(max_bytes: usize, next: impl Handler) -> impl Handler {
    let next = next.into_boxed_handler();
    move |mut req: Request| {
        req.limit_body(max_bytes);
        next.call(req)
    }
}
