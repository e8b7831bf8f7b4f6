//! Core middleware traits and the [`Next`] chain link.
//!
//! Two stage shapes exist:
//!
//! - [`Middleware`] inspects the request head and either answers with a
//!   response (short-circuit) or forwards the untouched request to [`Next`].
//! - `BodyMiddleware` is the single stage allowed to read the body. Its next
//!   link is always the `Terminal` that owns the payload slot. Both are
//!   internal to this crate, so the body stage cannot be replaced or moved.
//!
//! Both shapes live in one chain type, [`Next`], whose last link is always the
//! body-consuming variant. The body can therefore be read at most once per
//! request, and only immediately before business logic.
//!
//! # Example
//!
//! ```ignore
//! use tracker_middleware::{Middleware, Next, Request, Response, BoxFuture};
//! use tracker_core::TrackerContext;
//!
//! struct Audit;
//!
//! impl Middleware for Audit {
//!     fn name(&self) -> &'static str {
//!         "audit"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a TrackerContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, Response> {
//!         Box::pin(async move {
//!             tracing::debug!(parent: ctx.logger(), path = %request.uri().path(), "request");
//!             next.run(ctx, request).await
//!         })
//!     }
//! }
//! ```

use crate::terminal::Terminal;
use crate::types::{Request, Response};
use tracker_core::TrackerContext;

pub use tracker_core::BoxFuture;

/// A forwarding validation stage.
///
/// # Invariants
///
/// - A stage either returns its own response without calling `next`, or calls
///   `next.run()` exactly once with the same request
/// - A stage MUST NOT read the request body
pub trait Middleware: Send + Sync + 'static {
    /// Returns the unique name of this stage, used in log fields.
    fn name(&self) -> &'static str;

    /// Processes the request.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The shared pipeline context
    /// * `request` - The incoming HTTP request
    /// * `next` - The rest of the chain
    fn process<'a>(
        &'a self,
        ctx: &'a TrackerContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response>;
}

/// The body-consuming validation stage.
///
/// Receives the [`Terminal`] instead of a generic [`Next`]: reading the body
/// goes through [`Terminal::read_body`], which stores the bytes for the
/// business handler.
pub(crate) trait BodyMiddleware: Send + Sync + 'static {
    /// Returns the unique name of this stage, used in log fields.
    fn name(&self) -> &'static str;

    /// Processes the request, reading its body through `terminal`.
    fn process<'a>(
        &'a self,
        ctx: &'a TrackerContext,
        request: Request,
        terminal: Terminal<'a>,
    ) -> BoxFuture<'a, Response>;
}

/// Callback to invoke the rest of the chain.
///
/// Consumed by [`run`](Self::run), so it can only be invoked once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// A forwarding stage followed by more of the chain.
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    /// The body-consuming stage and the terminal it feeds.
    Consume {
        middleware: &'a dyn BodyMiddleware,
        terminal: Terminal<'a>,
    },
}

impl<'a> Next<'a> {
    /// Links a forwarding stage in front of `next`.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates the innermost link: the body stage and its terminal.
    pub(crate) fn consume(middleware: &'a dyn BodyMiddleware, terminal: Terminal<'a>) -> Self {
        Self {
            inner: NextInner::Consume {
                middleware,
                terminal,
            },
        }
    }

    /// Returns the name of the stage this link invokes.
    #[must_use]
    pub fn stage_name(&self) -> &'static str {
        match &self.inner {
            NextInner::Chain { middleware, .. } => middleware.name(),
            NextInner::Consume { middleware, .. } => middleware.name(),
        }
    }

    /// Invokes the next stage in the chain.
    pub async fn run(self, ctx: &TrackerContext, request: Request) -> Response {
        match self.inner {
            NextInner::Chain { middleware, next } => {
                middleware.process(ctx, request, *next).await
            }
            NextInner::Consume {
                middleware,
                terminal,
            } => middleware.process(ctx, request, terminal).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context, echo_handler, request, Passthrough};
    use http::StatusCode;
    use http_body_util::BodyExt;
    use std::sync::{Arc, Mutex};

    struct Recording {
        name: &'static str,
        visited: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Middleware for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            ctx: &'a TrackerContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                self.visited.lock().unwrap().push(self.name);
                next.run(ctx, request).await
            })
        }
    }

    #[tokio::test]
    async fn test_consume_link_runs_terminal() {
        let ctx = context();
        let handler = echo_handler();
        let next = Next::consume(&Passthrough, Terminal::new(&handler));
        assert_eq!(next.stage_name(), "passthrough");

        let response = next.run(&ctx, request(r#"{"event":"x"}"#)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"event":"x"}"#);
    }

    #[tokio::test]
    async fn test_chain_runs_outermost_first() {
        let ctx = context();
        let handler = echo_handler();
        let visited = Arc::new(Mutex::new(Vec::new()));

        let first = Recording {
            name: "first",
            visited: Arc::clone(&visited),
        };
        let second = Recording {
            name: "second",
            visited: Arc::clone(&visited),
        };

        let tail = Next::consume(&Passthrough, Terminal::new(&handler));
        let chain = Next::new(&first, Next::new(&second, tail));
        assert_eq!(chain.stage_name(), "first");

        let response = chain.run(&ctx, request("{}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*visited.lock().unwrap(), vec!["first", "second"]);
    }
}
