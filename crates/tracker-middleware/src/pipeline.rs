//! Fixed-order validation pipeline.
//!
//! Every inbound tracking request flows through the same three stages, in an
//! order that cannot be changed through the public API:
//!
//! 1. **Token authorization** - `Tracking-Token` lookup
//! 2. **Content type** - non-empty body, exact JSON media type
//! 3. **Schema validation** - body read and validated (body-consuming)
//!
//! The cheap, side-effect-free checks run first so that an unauthenticated
//! request is answered by the authorization stage even when its content type
//! is also wrong. The only stage that buffers the body sits right before the
//! business handler it feeds.

use crate::middleware::{BodyMiddleware, Middleware, Next};
use crate::stages::{
    ContentTypeMiddleware, SchemaValidationMiddleware, TokenAuthorizationMiddleware,
};
use crate::terminal::{EventHandler, Terminal};
use crate::types::{Request, Response};
use std::sync::Arc;
use tracker_core::TrackerContext;

/// A type-erased forwarding stage.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The assembled validation chain bound to its context and business handler.
///
/// Built once at startup and shared by every request; `process` builds a
/// fresh request-scoped [`Next`] chain per call.
///
/// # Example
///
/// ```ignore
/// use tracker_middleware::{FnEventHandler, Pipeline};
///
/// let pipeline = Pipeline::new(ctx, FnEventHandler::new(accept_event));
/// let response = pipeline.process(request).await;
/// ```
pub struct Pipeline {
    ctx: TrackerContext,
    stages: Vec<BoxedMiddleware>,
    body_stage: Arc<dyn BodyMiddleware>,
    handler: Arc<dyn EventHandler>,
}

impl Pipeline {
    /// Assembles the fixed chain around `handler`.
    pub fn new<H: EventHandler>(ctx: TrackerContext, handler: H) -> Self {
        let stages: Vec<BoxedMiddleware> = vec![
            Arc::new(TokenAuthorizationMiddleware::new()),
            Arc::new(ContentTypeMiddleware::new()),
        ];

        Self::from_parts(
            ctx,
            stages,
            Arc::new(SchemaValidationMiddleware::new()),
            Arc::new(handler),
        )
    }

    pub(crate) fn from_parts(
        ctx: TrackerContext,
        stages: Vec<BoxedMiddleware>,
        body_stage: Arc<dyn BodyMiddleware>,
        handler: Arc<dyn EventHandler>,
    ) -> Self {
        Self {
            ctx,
            stages,
            body_stage,
            handler,
        }
    }

    /// Runs one request through the chain.
    pub async fn process(&self, request: Request) -> Response {
        let next = self.build_chain();
        next.run(&self.ctx, request).await
    }

    /// Folds the forwarding stages right-to-left around the body stage.
    fn build_chain(&self) -> Next<'_> {
        let terminal = Terminal::new(self.handler.as_ref());
        let mut next = Next::consume(self.body_stage.as_ref(), terminal);

        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }

        next
    }

    /// Returns the names of all stages in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages
            .iter()
            .map(|stage| stage.name())
            .chain(std::iter::once(self.body_stage.name()))
            .collect()
    }

    /// Returns the context shared by every request.
    #[must_use]
    pub fn context(&self) -> &TrackerContext {
        &self.ctx
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish_non_exhaustive()
    }
}

/// Stage marker describing the fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Stage 1: tracking token lookup
    TokenAuthorization = 1,
    /// Stage 2: content type enforcement
    ContentType = 2,
    /// Stage 3: schema validation of the body
    SchemaValidation = 3,
}

impl Stage {
    /// Returns the stage name, matching the middleware's `name()`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TokenAuthorization => "token_authorization",
            Self::ContentType => "content_type",
            Self::SchemaValidation => "schema_validation",
        }
    }

    /// Returns true for the single stage allowed to read the body.
    #[must_use]
    pub const fn consumes_body(self) -> bool {
        matches!(self, Self::SchemaValidation)
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [Stage; 3] {
        [Self::TokenAuthorization, Self::ContentType, Self::SchemaValidation]
    }
}
