//! # Tracker Core
//!
//! Core types shared by every crate in the tracker ingestion pipeline.
//!
//! - [`TrackerContext`] - Immutable, process-wide bundle of capabilities
//! - [`TokenAuthorizer`] - "Is this token authorized?" capability
//! - [`SchemaValidator`] - "Validate this document" capability
//! - [`Rejection`] - Classification of request failures into client and internal errors
//! - [`MemoryTokenStore`] - In-memory [`TokenAuthorizer`]

#![doc(html_root_url = "https://docs.rs/tracker-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod capability;
mod context;
mod error;
pub mod store;

pub use capability::{
    BoxFuture, SchemaValidator, TokenAuthorizer, ValidationIssue, ValidationOutcome,
};
pub use context::TrackerContext;
pub use error::{AuthorizerError, Rejection, RejectionKind, SchemaError};
pub use store::MemoryTokenStore;
