//! Error types for the tracker pipeline.
//!
//! Request failures are classified by [`Rejection`]. Every rejection falls in
//! one of two kinds:
//!
//! | Kind | Status | Client sees |
//! |---|---|---|
//! | [`RejectionKind::Client`] | 4xx | status reason phrase only |
//! | [`RejectionKind::Internal`] | 500 | status reason phrase only |
//!
//! The underlying cause of an internal rejection is logged server-side and
//! never written to the response.

use http::StatusCode;
use thiserror::Error;

/// Error returned by a [`TokenAuthorizer`](crate::TokenAuthorizer) lookup.
#[derive(Error, Debug)]
pub enum AuthorizerError {
    /// The backing datastore could not be reached.
    #[error("token store unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },

    /// The backing datastore returned an error.
    #[error("token store error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl AuthorizerError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Error returned when a document cannot be submitted to a
/// [`SchemaValidator`](crate::SchemaValidator).
///
/// Schema violations are not errors; they are reported through
/// [`ValidationOutcome`](crate::ValidationOutcome).
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The document is not parseable JSON.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// The engine failed while evaluating the document.
    #[error("schema engine error: {0}")]
    Engine(String),
}

/// Whether a rejection was caused by the caller or by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    /// Malformed or unauthorized request.
    Client,
    /// Capability or I/O failure.
    Internal,
}

/// Reason a request was terminated before reaching business logic.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// `Tracking-Token` header absent or empty.
    #[error("tracking token missing")]
    MissingToken,

    /// The token is not authorized.
    #[error("tracking token not authorized")]
    Unauthorized,

    /// The token lookup failed.
    #[error("token authorization lookup failed")]
    AuthorizerFailed,

    /// The request declares an empty body.
    #[error("request body is empty")]
    EmptyBody,

    /// `Content-Type` is not the accepted literal.
    #[error("unsupported content type")]
    UnsupportedMediaType,

    /// The body stream could not be read.
    #[error("request body could not be read")]
    BodyRead,

    /// The schema validator could not evaluate the document.
    #[error("schema validator failed")]
    ValidatorFailed,

    /// The body violates the event schema.
    #[error("payload violates event schema")]
    InvalidPayload,
}

impl Rejection {
    /// Returns whether the caller or the service is at fault.
    #[must_use]
    pub const fn kind(self) -> RejectionKind {
        match self {
            Self::MissingToken
            | Self::Unauthorized
            | Self::EmptyBody
            | Self::UnsupportedMediaType
            | Self::InvalidPayload => RejectionKind::Client,
            Self::AuthorizerFailed | Self::BodyRead | Self::ValidatorFailed => {
                RejectionKind::Internal
            }
        }
    }

    /// Returns true for rejections that map to 500.
    #[must_use]
    pub const fn is_internal(self) -> bool {
        matches!(self.kind(), RejectionKind::Internal)
    }

    /// Returns the HTTP status code for this rejection.
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::MissingToken | Self::EmptyBody | Self::InvalidPayload => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::AuthorizerFailed | Self::BodyRead | Self::ValidatorFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
