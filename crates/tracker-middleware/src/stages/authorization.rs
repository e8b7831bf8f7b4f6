//! Token authorization stage.
//!
//! Reads the `Tracking-Token` header and asks the context's
//! [`TokenAuthorizer`](tracker_core::TokenAuthorizer) whether it may submit
//! events.
//!
//! # Pipeline Position
//!
//! Outermost stage. It performs no I/O on the request itself, so malformed
//! credentials are rejected before anything else is inspected:
//!
//! ```text
//! Request → [TokenAuthorization] → ContentType → SchemaValidation → Handler
//! ```
//!
//! | Condition | Status |
//! |---|---|
//! | header missing or empty | 400 |
//! | header not UTF-8 | 401 |
//! | lookup failed | 500 |
//! | token not authorized | 401 |
//! | authorized | forward |

use crate::{
    middleware::{BoxFuture, Middleware, Next},
    types::{Request, Response, ResponseExt},
};
use tracker_core::{Rejection, TrackerContext};

/// The header carrying the access token.
pub const TRACKING_TOKEN_HEADER: &str = "tracking-token";

/// Stage that rejects requests without an authorized tracking token.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenAuthorizationMiddleware;

impl TokenAuthorizationMiddleware {
    /// Creates the stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Reads the token header.
    ///
    /// Any non-empty value is a candidate, including UTF-8 outside ASCII.
    fn extract_token(request: &Request) -> TokenHeader {
        match request.headers().get(TRACKING_TOKEN_HEADER) {
            None => TokenHeader::Missing,
            Some(value) if value.is_empty() => TokenHeader::Missing,
            Some(value) => match std::str::from_utf8(value.as_bytes()) {
                Ok(token) => TokenHeader::Present(token.to_owned()),
                Err(_) => TokenHeader::NotUtf8,
            },
        }
    }
}

/// What the `Tracking-Token` header holds.
enum TokenHeader {
    /// Absent or empty.
    Missing,
    /// Bytes that no stored token can equal.
    NotUtf8,
    /// A candidate token for the authorizer.
    Present(String),
}

impl Middleware for TokenAuthorizationMiddleware {
    fn name(&self) -> &'static str {
        "token_authorization"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a TrackerContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let token = match Self::extract_token(&request) {
                TokenHeader::Present(token) => token,
                TokenHeader::Missing => {
                    tracing::warn!(parent: ctx.logger(), stage = self.name(), "tracking token missing");
                    return Response::rejection(Rejection::MissingToken);
                }
                TokenHeader::NotUtf8 => {
                    tracing::warn!(
                        parent: ctx.logger(),
                        stage = self.name(),
                        "unauthorized: tracking token is not valid UTF-8"
                    );
                    return Response::rejection(Rejection::Unauthorized);
                }
            };

            match ctx.authorizer().is_token_authorized(&token).await {
                Ok(true) => {
                    tracing::info!(parent: ctx.logger(), stage = self.name(), "authorized");
                    next.run(ctx, request).await
                }
                Ok(false) => {
                    tracing::warn!(parent: ctx.logger(), stage = self.name(), "unauthorized");
                    Response::rejection(Rejection::Unauthorized)
                }
                Err(e) => {
                    tracing::error!(
                        parent: ctx.logger(),
                        stage = self.name(),
                        error = %e,
                        "token authorization lookup failed"
                    );
                    Response::rejection(Rejection::AuthorizerFailed)
                }
            }
        })
    }
}
