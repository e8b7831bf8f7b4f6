//! Tracker Schema - JSON Schema validation for tracked events
//!
//! This crate provides the schema-validate capability used by the pipeline's
//! schema validation stage. A schema is compiled once at startup and shared
//! read-only by every request.
//!
//! # Overview
//!
//! ```text
//!   event.schema.json ──compile──▶ JsonSchemaValidator
//!                                        │
//!   request body bytes ──parse──▶ Value ─┴─▶ ValidationOutcome
//! ```
//!
//! Bytes that are not JSON never reach the engine; they are reported as a
//! [`SchemaError::MalformedDocument`](tracker_core::SchemaError) and answered
//! with 500 by the pipeline.
//!
//! # Example
//!
//! ```no_run
//! use tracker_schema::JsonSchemaValidator;
//!
//! let validator = JsonSchemaValidator::from_file("/etc/tracker/event.schema.json")?;
//! # Ok::<(), tracker_schema::SchemaLoadError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod validator;

pub use error::{SchemaLoadError, SchemaResult};
pub use validator::{JsonSchemaValidator, EVENT_SCHEMA};
