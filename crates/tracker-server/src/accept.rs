//! Default business handler.

use bytes::Bytes;
use http::request::Parts;
use http::StatusCode;
use tracing::info;
use tracker_core::TrackerContext;
use tracker_middleware::{BoxFuture, EventHandler, Response, ResponseExt};

/// Acknowledges every event that passed validation with `202 Accepted`.
///
/// The payload is only measured. Forwarding to a queue or a store is left to
/// handlers that wrap or replace this one.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptEvent;

impl AcceptEvent {
    /// Creates the handler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EventHandler for AcceptEvent {
    fn handle<'a>(
        &'a self,
        ctx: &'a TrackerContext,
        head: Parts,
        payload: Bytes,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            info!(
                parent: ctx.logger(),
                stage = "accept_event",
                http.path = %head.uri.path(),
                payload_bytes = payload.len(),
                "event accepted"
            );
            Response::status_text(StatusCode::ACCEPTED)
        })
    }
}
