use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;

use super::request_id::set_header;
use crate::context::PanicScope;
use crate::handler::Handler;
use crate::reply;
use crate::request::Request;

/// Turns a panic anywhere inside `next` into a `500 {"error":"internal error"}`.
///
/// The panic message and a backtrace are logged at ERROR through the
/// request's logger. When a [`request_id`](super::request_id) runs inside,
/// the line carries its id and the 500 keeps the `X-Request-ID` header.
///
/// This is the crate's only `catch_unwind`; everything else reports failure
/// with `Result`.
pub fn recoverer(next: impl Handler) -> impl Handler {
    let next = next.into_boxed_handler();
    move |mut req: Request| {
        let next = Arc::clone(&next);
        async move {
            let scope = PanicScope::default();
            req.map_context(|ctx| ctx.with_panic_scope(scope.clone()));
            let logger = req.context().logger();
            // `call` runs the handler up to its first await, so it goes
            // inside the guarded future too.
            let guarded = AssertUnwindSafe(async move { next.call(req).await });
            match guarded.catch_unwind().await {
                Ok(res) => res,
                Err(payload) => {
                    let backtrace = Backtrace::force_capture();
                    let (id, logger) = match scope.get() {
                        Some((id, inner)) => (Some(*id), inner.clone()),
                        None => (None, logger),
                    };
                    logger.in_scope(|| {
                        tracing::error!(
                            panic = panic_message(&*payload),
                            stacktrace = %backtrace,
                            "recovered from handler panic"
                        );
                    });
                    let mut res = reply::internal();
                    if let Some(id) = id {
                        set_header(&mut res, id);
                    }
                    res
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};

    use super::*;
    use crate::middleware::{X_REQUEST_ID, logger, request_id};
    use crate::response::Response;
    use crate::testing::{call, capture_logs, request};

    async fn panics(_req: Request) -> Response {
        panic!("some panic")
    }

    #[tokio::test]
    async fn panic_becomes_internal_error() {
        let (logs, _guard) = capture_logs();

        let res = call(recoverer(panics), request(Method::GET, "")).await;

        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(&res.body()[..], br#"{"error":"internal error"}"#);

        let out = logs.contents();
        assert!(out.contains("some panic"), "{out}");
        assert!(out.contains("stacktrace="), "{out}");
    }

    #[tokio::test]
    async fn formatted_panics_are_logged() {
        let (logs, _guard) = capture_logs();

        let handler = |_req: Request| async move {
            let id = 7;
            if id > 0 {
                panic!("user {id} vanished");
            }
            StatusCode::OK
        };
        call(recoverer(handler), request(Method::GET, "")).await;

        assert!(logs.contents().contains("user 7 vanished"));
    }

    #[tokio::test]
    async fn recovers_panics_below_other_middleware() {
        let (logs, _guard) = capture_logs();

        let res = call(recoverer(logger(panics)), request(Method::DELETE, "")).await;

        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(logs.contents().contains("some panic"));
    }

    #[tokio::test]
    async fn panics_below_request_id_keep_the_id() {
        let (logs, _guard) = capture_logs();

        let res = call(recoverer(request_id(panics)), request(Method::GET, "")).await;

        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let id = res.headers()[X_REQUEST_ID].to_str().unwrap().to_owned();
        let out = logs.contents();
        assert!(out.contains(&format!("request_id={id}")), "{out}");
    }

    #[tokio::test]
    async fn normal_responses_pass_through() {
        let ok = |_req: Request| async { StatusCode::NO_CONTENT };
        let res = call(recoverer(ok), request(Method::GET, "")).await;
        assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn panic_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u8), "non-string panic payload");
    }
}
