//! Streaming request body.
//!
//! Bodies stay streams until a handler asks for the bytes. That is what lets
//! [`body_limit`](crate::middleware::body_limit) cap memory use: the ceiling
//! is checked frame by frame while the body is collected, so an oversized
//! upload fails before it is buffered, whatever `Content-Length` claims.

use bytes::Bytes;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, Limited};

use crate::error::{BodyError, BoxError};

/// A type-erased request body.
///
/// Any `hyper` body (including `hyper::body::Incoming`) converts into it via
/// [`Body::new`].
pub struct Body(UnsyncBoxBody<Bytes, BoxError>);

impl Body {
    pub fn new<B>(body: B) -> Self
    where
        B: hyper::body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self(body.map_err(Into::into).boxed_unsync())
    }

    pub fn empty() -> Self {
        Self::new(Empty::<Bytes>::new())
    }

    /// Caps the body at `max_bytes`. Reading past the cap yields
    /// [`BodyError::TooLarge`].
    pub fn limited(self, max_bytes: usize) -> Self {
        Self(Limited::new(self.0, max_bytes).boxed_unsync())
    }

    /// Reads the whole body into memory.
    pub async fn collect(self) -> Result<Bytes, BodyError> {
        let collected = BodyExt::collect(self.0).await?;
        Ok(collected.to_bytes())
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::new(Full::new(bytes))
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes::from(bytes).into()
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Bytes::from(text).into()
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Bytes::from_static(text.as_bytes()).into()
    }
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Body").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collects_whole_body() {
        let bytes = Body::from("hello").collect().await.unwrap();
        assert_eq!(&bytes[..], b"hello");
    }

    #[tokio::test]
    async fn empty_body_collects_to_nothing() {
        assert!(Body::empty().collect().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn limit_is_inclusive() {
        let bytes = Body::from(vec![7u8; 1000]).limited(1000).collect().await.unwrap();
        assert_eq!(bytes.len(), 1000);
    }

    #[tokio::test]
    async fn over_limit_is_too_large() {
        let err = Body::from(vec![0u8; 1001]).limited(1000).collect().await.unwrap_err();
        assert!(matches!(err, BodyError::TooLarge), "{err:?}");
    }

    #[tokio::test]
    async fn nested_limits_keep_the_tightest() {
        let err = Body::from(vec![0u8; 200])
            .limited(100)
            .limited(1000)
            .collect()
            .await
            .unwrap_err();
        assert!(matches!(err, BodyError::TooLarge), "{err:?}");
    }
}
