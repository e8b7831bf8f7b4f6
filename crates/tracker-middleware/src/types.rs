//! Common types used throughout the middleware pipeline.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http_body::Body;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};
use tracker_core::Rejection;

/// Boxed error produced by a request body stream.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The HTTP request type used in the middleware pipeline.
pub type Request = http::Request<RequestBody>;

/// The HTTP response type used in the middleware pipeline.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// A sealed request body stream.
///
/// Forwarding stages can inspect the declared length, but only the
/// terminal handler can read the bytes. This
/// keeps the body read to at most once per request.
pub struct RequestBody {
    inner: UnsyncBoxBody<Bytes, BoxError>,
}

impl RequestBody {
    /// Wraps any byte body (e.g. `hyper::body::Incoming`).
    pub fn new<B>(body: B) -> Self
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self {
            inner: body.map_err(Into::into).boxed_unsync(),
        }
    }

    /// Creates an empty body.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Full::new(Bytes::new()))
    }

    /// Returns the exact body length when the sender declared it.
    ///
    /// `None` means the length is unknown (e.g. chunked transfer encoding).
    #[must_use]
    pub fn declared_len(&self) -> Option<u64> {
        self.inner.size_hint().exact()
    }

    /// Drains the stream into memory.
    pub(crate) async fn read_to_end(self) -> Result<Bytes, BoxError> {
        Ok(self.inner.collect().await?.to_bytes())
    }
}

impl Default for RequestBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBody")
            .field("declared_len", &self.declared_len())
            .finish_non_exhaustive()
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        Self::new(Full::new(bytes))
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from(Bytes::from(bytes))
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::from(Bytes::from(text))
    }
}

impl From<&'static str> for RequestBody {
    fn from(text: &'static str) -> Self {
        Self::from(Bytes::from_static(text.as_bytes()))
    }
}

/// Extension trait for building error responses.
pub trait ResponseExt {
    /// Creates a plain-text response whose body is the canonical reason
    /// phrase of `status`.
    fn status_text(status: http::StatusCode) -> Response;

    /// Creates the response for a pipeline rejection.
    ///
    /// Only the reason phrase is written; the rejection itself never leaks
    /// to the client.
    fn rejection(rejection: Rejection) -> Response;
}

impl ResponseExt for Response {
    fn status_text(status: http::StatusCode) -> Response {
        let reason = status.canonical_reason().unwrap_or("Unknown Status");
        let mut response = http::Response::new(Full::new(Bytes::from_static(reason.as_bytes())));
        *response.status_mut() = status;
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }

    fn rejection(rejection: Rejection) -> Response {
        Self::status_text(rejection.status_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_status_text_response() {
        let response = Response::status_text(StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_rejection_body_is_reason_phrase() {
        let response = Response::rejection(Rejection::AuthorizerFailed);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Internal Server Error");
    }

    #[test]
    fn test_declared_len() {
        assert_eq!(RequestBody::empty().declared_len(), Some(0));
        assert_eq!(RequestBody::from("{}").declared_len(), Some(2));
    }

    #[tokio::test]
    async fn test_read_to_end_returns_exact_bytes() {
        let body = RequestBody::from(vec![0_u8, 159, 146, 150]);
        let bytes = body.read_to_end().await.unwrap();
        assert_eq!(&bytes[..], &[0, 159, 146, 150]);
    }
}
