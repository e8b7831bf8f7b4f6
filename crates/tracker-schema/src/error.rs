//! Schema loading errors.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for schema loading.
pub type SchemaResult<T> = Result<T, SchemaLoadError>;

/// Errors that can occur while loading or compiling a schema.
///
/// These happen at startup. Per-request failures are reported through
/// [`tracker_core::SchemaError`] instead.
#[derive(Debug, Error)]
pub enum SchemaLoadError {
    /// The schema file could not be read.
    #[error("failed to read schema file {path}: {source}")]
    Io {
        /// Path of the schema file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The schema text is not JSON.
    #[error("schema is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The schema is JSON but not a valid JSON Schema.
    #[error("failed to compile schema: {0}")]
    Compile(String),
}
