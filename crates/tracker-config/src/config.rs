//! Top-level configuration type.

use serde::{Deserialize, Serialize};

use crate::{AuthSection, ConfigError, LoggingSection, SchemaSection, ServerSection};

/// Complete tracker service configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use tracker_config::TrackerConfig;
///
/// let config = TrackerConfig::default();
/// assert_eq!(config.server.listen_port, 1337);
/// assert!(config.validate().is_err()); // no schema path yet
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct TrackerConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Event schema location.
    #[serde(default)]
    pub schema: SchemaSection,

    /// Authorized tracking tokens.
    #[serde(default)]
    pub auth: AuthSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl TrackerConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the listen address is not an IP address or the port is 0
    /// - the events path does not start with `/`
    /// - the schema path is missing
    /// - the body limit is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.socket_addr()?;

        if self.server.listen_port == 0 {
            return Err(ConfigError::invalid_value(
                "server.listen_port",
                "must be between 1 and 65535",
            ));
        }

        if !self.server.events_path.starts_with('/') {
            return Err(ConfigError::invalid_value(
                "server.events_path",
                format!("must start with '/': {}", self.server.events_path),
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "server.max_body_bytes",
                "must be greater than 0",
            ));
        }

        if self.schema.path.is_none() {
            return Err(ConfigError::missing_field("schema.path"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn valid() -> TrackerConfig {
        TrackerConfig {
            schema: SchemaSection {
                path: Some(PathBuf::from("event.schema.json")),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_missing_schema_path() {
        let err = TrackerConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field } if field == "schema.path"));
    }

    #[test]
    fn test_zero_port() {
        let mut config = valid();
        config.server.listen_port = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "server.listen_port"
        ));
    }

    #[test]
    fn test_relative_events_path() {
        let mut config = valid();
        config.server.events_path = "track".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "server.events_path"
        ));
    }

    #[test]
    fn test_zero_body_limit() {
        let mut config = valid();
        config.server.max_body_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result: Result<TrackerConfig, _> = toml::from_str("[metrics]\nenabled = true\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<TrackerConfig, _> = toml::from_str("[server]\nport = 80\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: TrackerConfig = toml::from_str("[server]\nlisten_port = 8080\n").unwrap();
        assert_eq!(config.server.listen_port, 8080);
        assert_eq!(config.server.events_path, "/track");
    }
}
