//! The terminal, body-consuming end of the pipeline.
//!
//! A `Terminal` wraps the business [`EventHandler`] and owns the payload
//! slot. It is handed only to the `BodyMiddleware`
//! placed immediately before it, which is therefore the only stage able to
//! read the request body.
//!
//! ```text
//! ... → ContentType → [SchemaValidation] ──read_body──▶ payload slot
//!                             │                              │
//!                             └────────── run ──▶ EventHandler(head, payload)
//! ```

use crate::middleware::BoxFuture;
use crate::types::{BoxError, Request, Response, ResponseExt};
use bytes::Bytes;
use http::request::Parts;
use std::future::Future;
use thiserror::Error;
use tracker_core::{Rejection, TrackerContext};

/// Business logic receiving events that passed every validation stage.
pub trait EventHandler: Send + Sync + 'static {
    /// Handles one accepted event.
    ///
    /// `payload` holds the exact bytes of the request body.
    fn handle<'a>(
        &'a self,
        ctx: &'a TrackerContext,
        head: Parts,
        payload: Bytes,
    ) -> BoxFuture<'a, Response>;
}

/// An [`EventHandler`] created from an async function.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use http::StatusCode;
/// use http_body_util::Full;
/// use tracker_middleware::FnEventHandler;
///
/// let handler = FnEventHandler::new(|_head: http::request::Parts, payload: Bytes| async move {
///     let mut response = http::Response::new(Full::new(Bytes::new()));
///     *response.status_mut() = if payload.is_empty() {
///         StatusCode::NO_CONTENT
///     } else {
///         StatusCode::ACCEPTED
///     };
///     response
/// });
/// # let _ = handler;
/// ```
pub struct FnEventHandler<F> {
    func: F,
}

impl<F> FnEventHandler<F> {
    /// Creates a new function-based event handler.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F, Fut> EventHandler for FnEventHandler<F>
where
    F: Fn(Parts, Bytes) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn handle<'a>(
        &'a self,
        _ctx: &'a TrackerContext,
        head: Parts,
        payload: Bytes,
    ) -> BoxFuture<'a, Response> {
        Box::pin((self.func)(head, payload))
    }
}

/// Error reading the request body into the payload slot.
#[derive(Debug, Error)]
pub(crate) enum BodyError {
    /// The payload slot was already filled for this request.
    #[error("request body already consumed")]
    AlreadyConsumed,

    /// The body stream failed.
    #[error("failed to read request body: {0}")]
    Read(#[source] BoxError),
}

/// Terminal handler: the payload slot plus the business handler it feeds.
///
/// One `Terminal` is created per request when the chain is built, so the
/// slot is request-scoped.
pub(crate) struct Terminal<'a> {
    handler: &'a dyn EventHandler,
    payload: Option<Bytes>,
}

impl<'a> Terminal<'a> {
    pub(crate) fn new(handler: &'a dyn EventHandler) -> Self {
        Self {
            handler,
            payload: None,
        }
    }

    /// Reads the whole request body into the payload slot.
    ///
    /// Returns the request head and a handle to the stored bytes. The slot
    /// can be filled only once.
    pub async fn read_body(&mut self, request: Request) -> Result<(Parts, Bytes), BodyError> {
        if self.payload.is_some() {
            return Err(BodyError::AlreadyConsumed);
        }

        let (head, body) = request.into_parts();
        let payload = body.read_to_end().await.map_err(BodyError::Read)?;
        self.payload = Some(payload.clone());
        Ok((head, payload))
    }

    #[cfg(test)]
    fn payload(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    /// Invokes the business handler with the stored payload.
    ///
    /// Running a terminal whose body was never read is a wiring bug; it is
    /// logged and answered with 500.
    pub async fn run(self, ctx: &TrackerContext, head: Parts) -> Response {
        match self.payload {
            Some(payload) => self.handler.handle(ctx, head, payload).await,
            None => {
                tracing::error!(
                    parent: ctx.logger(),
                    stage = "terminal",
                    "terminal handler invoked before the request body was read"
                );
                Response::rejection(Rejection::BodyRead)
            }
        }
    }
}

impl std::fmt::Debug for Terminal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal")
            .field("payload_len", &self.payload.as_ref().map(Bytes::len))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context, echo_handler};
    use crate::types::RequestBody;
    use http::StatusCode;
    use http_body_util::BodyExt;

    fn request(body: &'static str) -> Request {
        http::Request::builder()
            .uri("/track")
            .body(RequestBody::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_read_body_fills_slot_once() {
        let handler = echo_handler();
        let mut terminal = Terminal::new(&handler);
        assert!(terminal.payload().is_none());

        let (_head, payload) = terminal.read_body(request(r#"{"event":"a"}"#)).await.unwrap();
        assert_eq!(&payload[..], br#"{"event":"a"}"#);
        assert_eq!(terminal.payload(), Some(&payload));

        let second = terminal.read_body(request("{}")).await;
        assert!(matches!(second, Err(BodyError::AlreadyConsumed)));
        assert_eq!(&terminal.payload().unwrap()[..], br#"{"event":"a"}"#);
    }

    #[tokio::test]
    async fn test_run_delivers_payload() {
        let ctx = context();
        let handler = echo_handler();
        let mut terminal = Terminal::new(&handler);

        let (head, _) = terminal.read_body(request("payload")).await.unwrap();
        let response = terminal.run(&ctx, head).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"payload");
    }

    #[tokio::test]
    async fn test_run_without_payload_is_internal_error() {
        let ctx = context();
        let handler = echo_handler();
        let terminal = Terminal::new(&handler);

        let (head, _) = request("{}").into_parts();
        let response = terminal.run(&ctx, head).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
