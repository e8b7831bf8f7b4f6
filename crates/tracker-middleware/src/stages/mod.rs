//! Validation stages.
//!
//! Stages run in a fixed order and cannot be disabled or reordered:
//!
//! 1. [`authorization`] - Tracking-Token lookup
//! 2. [`content_type`] - non-empty body with the exact JSON media type
//! 3. [`validation`] - schema validation of the body (body-consuming)

pub mod authorization;
pub mod content_type;
pub mod validation;

pub use authorization::{TokenAuthorizationMiddleware, TRACKING_TOKEN_HEADER};
pub use content_type::{ContentTypeMiddleware, ACCEPTED_CONTENT_TYPE};
pub use validation::SchemaValidationMiddleware;
