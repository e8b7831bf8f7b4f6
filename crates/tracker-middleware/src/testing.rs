//! Shared fixtures for unit tests.

use crate::middleware::{BodyMiddleware, BoxFuture};
use crate::terminal::{EventHandler, FnEventHandler, Terminal};
use crate::types::{Request, RequestBody, Response, ResponseExt};
use bytes::Bytes;
use http_body_util::Full;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracker_core::{
    AuthorizerError, MemoryTokenStore, Rejection, SchemaError, SchemaValidator, TokenAuthorizer,
    TrackerContext, ValidationIssue, ValidationOutcome,
};

pub const TOKEN: &str = "valid-token";
pub const JSON_UTF8: &str = "application/json; charset=UTF-8";

/// Accepts documents that parse as JSON objects with a string `event` field.
pub struct EventFieldValidator;

impl SchemaValidator for EventFieldValidator {
    fn validate(&self, document: &[u8]) -> Result<ValidationOutcome, SchemaError> {
        let value: serde_json::Value = serde_json::from_slice(document)
            .map_err(|e| SchemaError::MalformedDocument(e.to_string()))?;

        if value.get("event").is_some_and(serde_json::Value::is_string) {
            Ok(ValidationOutcome::success())
        } else {
            Ok(ValidationOutcome::failure(vec![ValidationIssue::new(
                "/event",
                "required string",
            )]))
        }
    }
}

/// Authorizer whose backend is always down.
pub struct BrokenAuthorizer;

impl TokenAuthorizer for BrokenAuthorizer {
    fn is_token_authorized<'a>(
        &'a self,
        _token: &'a str,
    ) -> BoxFuture<'a, Result<bool, AuthorizerError>> {
        Box::pin(async { Err(AuthorizerError::unavailable("db host 10.0.0.7 refused")) })
    }
}

pub fn context() -> TrackerContext {
    TrackerContext::new(
        Arc::new(MemoryTokenStore::from_tokens([TOKEN])),
        Arc::new(EventFieldValidator),
    )
}

pub fn broken_auth_context() -> TrackerContext {
    TrackerContext::new(Arc::new(BrokenAuthorizer), Arc::new(EventFieldValidator))
}

/// Responds 200 with the payload it received as the body.
pub fn echo_handler() -> impl EventHandler {
    FnEventHandler::new(|_head: http::request::Parts, payload: Bytes| async move {
        http::Response::new(Full::new(payload))
    })
}

pub fn request(body: &'static str) -> Request {
    http::Request::builder()
        .method("POST")
        .uri("/track")
        .body(RequestBody::from(body))
        .unwrap()
}

/// Body stage that reads the body and forwards without validating.
pub struct Passthrough;

impl BodyMiddleware for Passthrough {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a TrackerContext,
        request: Request,
        mut terminal: Terminal<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            match terminal.read_body(request).await {
                Ok((head, _)) => terminal.run(ctx, head).await,
                Err(_) => Response::rejection(Rejection::BodyRead),
            }
        })
    }
}

/// A body of unknown length whose stream fails on the first poll.
pub struct FailingBody;

impl http_body::Body for FailingBody {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<http_body::Frame<Self::Data>, Self::Error>>> {
        Poll::Ready(Some(Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "peer reset while streaming body",
        ))))
    }
}
