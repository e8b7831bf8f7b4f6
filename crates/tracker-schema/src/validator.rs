//! JSON Schema backed [`SchemaValidator`].

use crate::error::{SchemaLoadError, SchemaResult};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;
use tracker_core::{SchemaError, SchemaValidator, ValidationIssue, ValidationOutcome};

/// The default event schema shipped with the crate.
pub const EVENT_SCHEMA: &str = include_str!("../schemas/event.schema.json");

/// A compiled JSON Schema.
///
/// Compiled once and shared by every request; validation takes `&self` only.
///
/// # Example
///
/// ```
/// use tracker_core::SchemaValidator;
/// use tracker_schema::JsonSchemaValidator;
///
/// let validator = JsonSchemaValidator::event_schema().unwrap();
///
/// assert!(validator.validate(br#"{"event":"signup"}"#).unwrap().is_valid());
/// assert!(!validator.validate(br#"{"event":""}"#).unwrap().is_valid());
/// assert!(validator.validate(b"not json").is_err());
/// ```
pub struct JsonSchemaValidator {
    compiled: JSONSchema,
}

impl JsonSchemaValidator {
    /// Compiles a schema document.
    pub fn from_value(schema: &Value) -> SchemaResult<Self> {
        let compiled = JSONSchema::compile(schema)
            .map_err(|e| SchemaLoadError::Compile(e.to_string()))?;
        Ok(Self { compiled })
    }

    /// Reads and compiles the schema at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SchemaLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let validator = text.parse()?;
        debug!(path = %path.display(), "loaded event schema");
        Ok(validator)
    }

    /// Compiles the bundled [`EVENT_SCHEMA`].
    pub fn event_schema() -> SchemaResult<Self> {
        EVENT_SCHEMA.parse()
    }

    fn issues(&self, instance: &Value) -> Vec<ValidationIssue> {
        match self.compiled.validate(instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|e| ValidationIssue::new(e.instance_path.to_string(), e.to_string()))
                .collect(),
        }
    }
}

impl FromStr for JsonSchemaValidator {
    type Err = SchemaLoadError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let schema: Value = serde_json::from_str(text)?;
        Self::from_value(&schema)
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, document: &[u8]) -> Result<ValidationOutcome, SchemaError> {
        let instance: Value = serde_json::from_slice(document)
            .map_err(|e| SchemaError::MalformedDocument(e.to_string()))?;

        let issues = self.issues(&instance);
        if issues.is_empty() {
            Ok(ValidationOutcome::success())
        } else {
            Ok(ValidationOutcome::failure(issues))
        }
    }
}

impl std::fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaValidator").finish_non_exhaustive()
    }
}
