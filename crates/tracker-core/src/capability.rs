//! Capabilities injected into the pipeline through the [`TrackerContext`].
//!
//! The pipeline depends on exactly two external collaborators, each reduced
//! to a single operation:
//!
//! | Capability | Operation |
//! |---|---|
//! | [`TokenAuthorizer`] | is this token authorized? |
//! | [`SchemaValidator`] | validate this document against the compiled schema |
//!
//! Both are shared by every in-flight request and must tolerate concurrent
//! invocation without external synchronization.
//!
//! [`TrackerContext`]: crate::TrackerContext

use crate::error::{AuthorizerError, SchemaError};
use std::future::Future;
use std::pin::Pin;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Answers whether an access token may submit tracking events.
///
/// # Example
///
/// ```
/// use tracker_core::{AuthorizerError, BoxFuture, TokenAuthorizer};
///
/// struct AllowAll;
///
/// impl TokenAuthorizer for AllowAll {
///     fn is_token_authorized<'a>(
///         &'a self,
///         _token: &'a str,
///     ) -> BoxFuture<'a, Result<bool, AuthorizerError>> {
///         Box::pin(async { Ok(true) })
///     }
/// }
/// ```
pub trait TokenAuthorizer: Send + Sync + 'static {
    /// Returns `Ok(true)` if the token is authorized, `Ok(false)` if it is
    /// unknown or revoked, and an error if the lookup itself failed.
    fn is_token_authorized<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, Result<bool, AuthorizerError>>;
}

/// Validates raw documents against an already-compiled schema.
///
/// Implementations are stateless with respect to the request: the schema is
/// compiled once, and `validate` may be called from many tasks at once.
pub trait SchemaValidator: Send + Sync + 'static {
    /// Validates `document`.
    ///
    /// A schema violation is reported through the returned
    /// [`ValidationOutcome`]. An `Err` means the document could not be
    /// submitted to the engine at all.
    fn validate(&self, document: &[u8]) -> Result<ValidationOutcome, SchemaError>;
}

/// Result of validating one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// Whether the document satisfied the schema.
    pub valid: bool,
    /// Schema violations, empty when `valid` is true.
    pub errors: Vec<ValidationIssue>,
}

impl ValidationOutcome {
    /// Creates a passing outcome.
    #[must_use]
    pub fn success() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Creates a failing outcome with the given issues.
    #[must_use]
    pub fn failure(errors: Vec<ValidationIssue>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }

    /// Returns true if the document satisfied the schema.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// JSON pointer to the offending value in the document.
    pub path: String,
    /// Human-readable description of the violated rule.
    pub message: String,
}

impl ValidationIssue {
    /// Creates a new issue.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}
