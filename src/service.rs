//! Adapter from a [`Handler`] to a hyper `Service`.
//!
//! apikit does not bind sockets. The host owns the accept loop and hands each
//! connection to hyper; [`into_service`] is the glue:
//!
//! ```rust,no_run
//! use apikit::middleware::Stack;
//! use apikit::{Request, Response};
//! use hyper_util::rt::{TokioExecutor, TokioIo};
//! use hyper_util::server::conn::auto::Builder;
//!
//! async fn hello(_req: Request) -> Response { Response::text("hello") }
//!
//! # async fn run() -> std::io::Result<()> {
//! let service = apikit::into_service(Stack::new().wrap(hello));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! loop {
//!     let (stream, _) = listener.accept().await?;
//!     let service = service.clone();
//!     tokio::spawn(async move {
//!         let _ = Builder::new(TokioExecutor::new())
//!             .serve_connection(TokioIo::new(stream), service)
//!             .await;
//!     });
//! }
//! # }
//! ```

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http_body_util::Full;

use crate::error::BoxError;
use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;

/// A handler packaged as a `hyper::service::Service`. Cheap to clone: every
/// connection shares the same handler.
#[derive(Clone)]
pub struct HandlerService {
    handler: BoxedHandler,
}

pub fn into_service(handler: impl Handler) -> HandlerService {
    HandlerService { handler: handler.into_boxed_handler() }
}

impl<B> hyper::service::Service<http::Request<B>> for HandlerService
where
    B: hyper::body::Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    type Response = http::Response<Full<Bytes>>;
    // Every failure has already become a response by the time it gets here.
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Infallible>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let fut = self.handler.call(Request::from(req));
        Box::pin(async move { Ok(fut.await.into_inner()) })
    }
}

impl std::fmt::Debug for HandlerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use http_body_util::BodyExt;
    use hyper::service::Service;

    use super::*;
    use crate::response::Response;

    async fn echo(mut req: Request) -> Response {
        match req.bytes().await {
            Ok(bytes) => Response::builder().status(StatusCode::OK).json(bytes),
            Err(_) => Response::status(StatusCode::BAD_REQUEST),
        }
    }

    #[tokio::test]
    async fn serves_http_requests() {
        let service = into_service(echo);
        let req = http::Request::builder()
            .method("POST")
            .uri("/echo")
            .body(Full::new(Bytes::from_static(br#"{"a":1}"#)))
            .unwrap();

        let res = service.call(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"a":1}"#);
    }
}
