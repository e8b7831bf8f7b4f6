//! Content-type enforcement stage.
//!
//! Rejects requests that declare an empty body or do not carry the exact
//! accepted `Content-Type`. Runs before the body is read, so a large body with
//! the wrong type is never buffered.
//!
//! The comparison is byte-for-byte, not a media-type parse:
//! `application/json; charset=utf-8` and `application/json` are both rejected.

use crate::{
    middleware::{BoxFuture, Middleware, Next},
    types::{Request, Response, ResponseExt},
};
use http::header::CONTENT_TYPE;
use tracker_core::{Rejection, TrackerContext};

/// The only accepted `Content-Type` value.
pub const ACCEPTED_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Stage that enforces a non-empty JSON body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentTypeMiddleware;

impl ContentTypeMiddleware {
    /// Creates the stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns true if the first `Content-Type` value is exactly the
    /// accepted literal.
    fn is_accepted(request: &Request) -> bool {
        request
            .headers()
            .get(CONTENT_TYPE)
            .is_some_and(|value| value.as_bytes() == ACCEPTED_CONTENT_TYPE.as_bytes())
    }
}

impl Middleware for ContentTypeMiddleware {
    fn name(&self) -> &'static str {
        "content_type"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a TrackerContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            if request.body().declared_len() == Some(0) {
                tracing::warn!(parent: ctx.logger(), stage = self.name(), "request body is empty");
                return Response::rejection(Rejection::EmptyBody);
            }

            if !Self::is_accepted(&request) {
                let received = request
                    .headers()
                    .get(CONTENT_TYPE)
                    .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                    .unwrap_or_default();
                tracing::warn!(
                    parent: ctx.logger(),
                    stage = self.name(),
                    received = %received,
                    "invalid content type"
                );
                return Response::rejection(Rejection::UnsupportedMediaType);
            }

            next.run(ctx, request).await
        })
    }
}
