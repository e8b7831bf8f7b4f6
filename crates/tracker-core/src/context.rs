//! Process-wide pipeline context.
//!
//! The [`TrackerContext`] is created once at startup and shared, read-only,
//! by every request. It carries the two capabilities the pipeline needs and
//! the logger stages write to.

use crate::capability::{SchemaValidator, TokenAuthorizer};
use std::sync::Arc;
use tracing::Span;

/// Immutable bundle of capabilities shared by every in-flight request.
///
/// Cloning is cheap: capabilities are reference counted.
///
/// # Logging
///
/// Stages never log through a global target. Every event is emitted with the
/// context's [`logger`](Self::logger) span as its explicit parent, so the
/// service name and any fields attached at startup travel with each line.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tracker_core::{
///     MemoryTokenStore, SchemaError, SchemaValidator, TrackerContext, ValidationOutcome,
/// };
///
/// struct AcceptAll;
///
/// impl SchemaValidator for AcceptAll {
///     fn validate(&self, _document: &[u8]) -> Result<ValidationOutcome, SchemaError> {
///         Ok(ValidationOutcome::success())
///     }
/// }
///
/// let ctx = TrackerContext::new(
///     Arc::new(MemoryTokenStore::from_tokens(["secret"])),
///     Arc::new(AcceptAll),
/// )
/// .with_logger(tracing::info_span!("tracker", service = "ingest"));
///
/// let shared = ctx.clone();
/// assert!(Arc::ptr_eq(ctx.authorizer(), shared.authorizer()));
/// ```
#[derive(Clone)]
pub struct TrackerContext {
    /// Token authorization capability.
    authorizer: Arc<dyn TokenAuthorizer>,

    /// Compiled-schema validation capability.
    validator: Arc<dyn SchemaValidator>,

    /// Parent span for every event emitted by pipeline stages.
    logger: Span,
}

impl TrackerContext {
    /// Creates a context from its two capabilities.
    ///
    /// The logger defaults to a disabled span; events are then emitted as
    /// root events.
    #[must_use]
    pub fn new(
        authorizer: Arc<dyn TokenAuthorizer>,
        validator: Arc<dyn SchemaValidator>,
    ) -> Self {
        Self {
            authorizer,
            validator,
            logger: Span::none(),
        }
    }

    /// Replaces the logger span.
    #[must_use]
    pub fn with_logger(mut self, logger: Span) -> Self {
        self.logger = logger;
        self
    }

    /// Returns the token authorization capability.
    #[must_use]
    pub fn authorizer(&self) -> &Arc<dyn TokenAuthorizer> {
        &self.authorizer
    }

    /// Returns the schema validation capability.
    #[must_use]
    pub fn validator(&self) -> &Arc<dyn SchemaValidator> {
        &self.validator
    }

    /// Returns the logger span stages use as the parent of their events.
    #[must_use]
    pub fn logger(&self) -> &Span {
        &self.logger
    }
}

impl std::fmt::Debug for TrackerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerContext")
            .field("logger", &self.logger)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryTokenStore, SchemaError, ValidationOutcome};

    struct RejectAll;

    impl SchemaValidator for RejectAll {
        fn validate(&self, _document: &[u8]) -> Result<ValidationOutcome, SchemaError> {
            Ok(ValidationOutcome::failure(vec![]))
        }
    }

    fn context() -> TrackerContext {
        TrackerContext::new(
            Arc::new(MemoryTokenStore::from_tokens(["abc"])),
            Arc::new(RejectAll),
        )
    }

    #[test]
    fn test_clone_shares_capabilities() {
        let ctx = context();
        let clone = ctx.clone();
        assert!(Arc::ptr_eq(ctx.authorizer(), clone.authorizer()));
        assert!(Arc::ptr_eq(ctx.validator(), clone.validator()));
    }

    #[test]
    fn test_default_logger_is_disabled() {
        let ctx = context();
        assert!(ctx.logger().is_none());
    }

    #[tokio::test]
    async fn test_capabilities_are_reachable() {
        let ctx = context();
        assert!(ctx.authorizer().is_token_authorized("abc").await.unwrap());
        assert!(!ctx.validator().validate(b"{}").unwrap().is_valid());
    }

    #[test]
    fn test_debug_hides_capabilities() {
        let rendered = format!("{:?}", context());
        assert!(rendered.starts_with("TrackerContext"));
    }
}
