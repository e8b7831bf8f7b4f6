//! Configuration sections.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use tracker_telemetry::LogConfig;

use crate::ConfigError;

/// HTTP listener settings.
///
/// # Example
///
/// ```toml
/// [server]
/// listen_addr = "127.0.0.1"
/// listen_port = 8080
/// events_path = "/v1/track"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    /// IP address to bind.
    pub listen_addr: String,

    /// TCP port to bind.
    pub listen_port: u16,

    /// Path that accepts tracked events.
    pub events_path: String,

    /// How long to wait for in-flight connections on shutdown.
    pub shutdown_timeout_secs: u64,

    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 1337,
            events_path: "/track".to_string(),
            shutdown_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl ServerSection {
    /// Returns the socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.listen_addr.parse().map_err(|_| {
            ConfigError::invalid_value(
                "server.listen_addr",
                format!("invalid IP address: {}", self.listen_addr),
            )
        })?;
        Ok(SocketAddr::new(ip, self.listen_port))
    }

    /// Returns the shutdown timeout as a [`Duration`].
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Event schema location.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaSection {
    /// Path to the JSON Schema file events are validated against.
    pub path: Option<PathBuf>,
}

/// Statically provisioned tracking tokens.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AuthSection {
    /// Tokens accepted in the `Tracking-Token` header.
    pub tokens: Vec<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// Filter directive (e.g. "info" or "tracker_middleware=debug").
    pub level: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

impl LoggingSection {
    /// Converts this section into a telemetry [`LogConfig`].
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        let base = match self.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        base.with_level(self.level.clone())
    }
}
