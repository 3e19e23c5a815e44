//! Incoming HTTP request type.

use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, Method, Uri};
use serde::de::DeserializeOwned;

use crate::body::Body;
use crate::context::Context;
use crate::error::{BodyError, BoxError};

/// An incoming HTTP request together with its per-request [`Context`].
pub struct Request {
    parts: Parts,
    body: Body,
    context: Context,
}

impl Request {
    pub fn new(parts: Parts, body: Body) -> Self {
        Self { parts, body, context: Context::default() }
    }

    pub fn method(&self) -> &Method { &self.parts.method }
    pub fn uri(&self) -> &Uri { &self.parts.uri }
    pub fn path(&self) -> &str { self.parts.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.parts.headers }
    pub fn context(&self) -> &Context { &self.context }

    /// Case-insensitive header lookup. Values that are not visible ASCII are
    /// treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name)?.to_str().ok()
    }

    /// Replaces the context with `f(current)`.
    ///
    /// This is how middleware enriches the context for everything nested
    /// inside it:
    ///
    /// ```rust
    /// # use apikit::{Context, Request};
    /// # use std::time::Duration;
    /// # fn enrich(req: &mut Request) {
    /// req.map_context(|ctx| ctx.with_timeout(Duration::from_secs(2)));
    /// # }
    /// ```
    pub fn map_context(&mut self, f: impl FnOnce(Context) -> Context) {
        let current = std::mem::take(&mut self.context);
        self.context = f(current);
    }

    /// Caps the body at `max_bytes`. See [`Body::limited`].
    pub fn limit_body(&mut self, max_bytes: usize) {
        let body = std::mem::take(&mut self.body);
        self.body = body.limited(max_bytes);
    }

    /// Reads the whole body. The body is consumed: a second call returns an
    /// empty buffer.
    pub async fn bytes(&mut self) -> Result<Bytes, BodyError> {
        std::mem::take(&mut self.body).collect().await
    }

    /// Reads the body and decodes it as JSON.
    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T, BodyError> {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn into_body(self) -> Body {
        self.body
    }
}

impl<B> From<http::Request<B>> for Request
where
    B: hyper::body::Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    fn from(req: http::Request<B>) -> Self {
        let (parts, body) = req.into_parts();
        Self::new(parts, Body::new(body))
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.parts.method)
            .field("uri", &self.parts.uri)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
