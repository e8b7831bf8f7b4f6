//! Schema validation stage.
//!
//! The only stage that reads the request body. It buffers the body through
//! the terminal slot, validates the bytes with the context's
//! [`SchemaValidator`](tracker_core::SchemaValidator) and, when the document
//! conforms, hands the same bytes to the business handler.
//!
//! # Pipeline Position
//!
//! ```text
//! Request → TokenAuthorization → ContentType → [SchemaValidation] → Handler
//! ```
//!
//! | Condition | Status |
//! |---|---|
//! | body could not be read | 500 |
//! | validator could not run | 500 |
//! | document does not conform | 400 |
//! | document conforms | forward |

use crate::{
    middleware::{BodyMiddleware, BoxFuture},
    terminal::Terminal,
    types::{Request, Response, ResponseExt},
};
use tracker_core::{Rejection, TrackerContext};

/// Stage that validates the request body against the event schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidationMiddleware;

impl SchemaValidationMiddleware {
    /// Creates the stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl BodyMiddleware for SchemaValidationMiddleware {
    fn name(&self) -> &'static str {
        "schema_validation"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a TrackerContext,
        request: Request,
        mut terminal: Terminal<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let (head, payload) = match terminal.read_body(request).await {
                Ok(read) => read,
                Err(e) => {
                    tracing::error!(
                        parent: ctx.logger(),
                        stage = self.name(),
                        error = %e,
                        "failed to read request body"
                    );
                    return Response::rejection(Rejection::BodyRead);
                }
            };

            let outcome = match ctx.validator().validate(&payload) {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(
                        parent: ctx.logger(),
                        stage = self.name(),
                        error = %e,
                        "schema validator failed"
                    );
                    return Response::rejection(Rejection::ValidatorFailed);
                }
            };

            if !outcome.is_valid() {
                tracing::warn!(
                    parent: ctx.logger(),
                    stage = self.name(),
                    issues = outcome.errors.len(),
                    "payload failed schema validation"
                );
                for issue in &outcome.errors {
                    tracing::debug!(parent: ctx.logger(), stage = self.name(), issue = %issue);
                }
                return Response::rejection(Rejection::InvalidPayload);
            }

            terminal.run(ctx, head).await
        })
    }
}
