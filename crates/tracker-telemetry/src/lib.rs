//! Logging setup for the tracker ingestion service.
//!
//! - **Subscriber**: JSON or pretty output via `tracing-subscriber`, filtered
//!   by `RUST_LOG` or the configured directive
//! - **Service span**: the span handed to the pipeline context as its logger
//!
//! # Example
//!
//! ```
//! use tracker_telemetry::{service_span, LogConfig};
//!
//! let config = LogConfig::development().with_level("tracker_middleware=debug");
//! let span = service_span(&config.service_name);
//! tracing::debug!(parent: &span, "configured");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{
    create_env_filter, init_logging, service_span, LogConfig, DEFAULT_SERVICE_NAME,
};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
