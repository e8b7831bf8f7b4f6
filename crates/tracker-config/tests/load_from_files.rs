//! Loading configuration files and env files from disk.

use std::io::Write;
use std::path::PathBuf;
use tempfile::Builder;
use tracker_config::{ConfigError, ConfigLoader, LogFormat};

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_toml_file() {
    let file = write_temp(
        ".toml",
        r#"
        [server]
        listen_port = 4000
        max_body_bytes = 2048

        [schema]
        path = "schemas/event.schema.json"

        [auth]
        tokens = ["web"]
        "#,
    );

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
    assert_eq!(config.server.listen_port, 4000);
    assert_eq!(config.server.max_body_bytes, 2048);
    assert_eq!(config.schema.path, Some(PathBuf::from("schemas/event.schema.json")));
    assert_eq!(config.auth.tokens, vec!["web"]);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_load_json_file() {
    let file = write_temp(
        ".json",
        r#"{"schema": {"path": "event.json"}, "logging": {"format": "pretty"}}"#,
    );

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
fn test_unknown_field_in_file() {
    let file = write_temp(".toml", "[server]\nhttp_addr = \"0.0.0.0:80\"\n");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::TomlError(_))));
}

#[test]
fn test_unsupported_extension() {
    let file = write_temp(".yaml", "server: {}\n");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
}

#[test]
fn test_dotenv_file_feeds_env_overrides() {
    let file = write_temp(
        ".env",
        "TRACKER_DOTENV_TEST__SCHEMA__PATH=/srv/event.json\nTRACKER_DOTENV_TEST__SERVER__LISTEN_PORT=7001\n",
    );

    let config = ConfigLoader::new()
        .with_dotenv_file(file.path())
        .unwrap()
        .with_env_prefix("TRACKER_DOTENV_TEST")
        .load()
        .unwrap();

    assert_eq!(config.server.listen_port, 7001);
    assert_eq!(config.schema.path, Some(PathBuf::from("/srv/event.json")));
}

#[test]
fn test_missing_dotenv_file() {
    let result = ConfigLoader::new().with_dotenv_file("/nonexistent/.env");
    assert!(matches!(result, Err(ConfigError::Dotenv(_))));
}
