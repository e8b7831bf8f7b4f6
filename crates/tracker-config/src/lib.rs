//! Typed configuration for the tracker ingestion service.
//!
//! - TOML and JSON configuration files
//! - `.env` files and environment variable overrides
//! - Strict parsing (fails on unknown fields)
//! - Layered loading (defaults → file → env)
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! listen_addr = "0.0.0.0"
//! listen_port = 1337
//! events_path = "/track"
//! shutdown_timeout_secs = 30
//! max_body_bytes = 1048576
//!
//! [schema]
//! path = "/etc/tracker/event.schema.json"
//!
//! [auth]
//! tokens = ["site-a", "site-b"]
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Every key can be overridden with `PREFIX__SECTION__KEY`:
//!
//! - `TRACKER__SERVER__LISTEN_PORT=8080`
//! - `TRACKER__SCHEMA__PATH=/srv/event.schema.json`
//! - `TRACKER__AUTH__TOKENS=site-a,site-b`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod sections;

pub use config::TrackerConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX, ENV_KEYS};
pub use sections::{AuthSection, LogFormat, LoggingSection, SchemaSection, ServerSection};
