//! JSON/YAML parsing of metadata text.
//!
//! The error policy depends on the format hint:
//!
//! | hint | on failure |
//! |------|------------|
//! | `json` | [`MetadataError::InvalidJson`] |
//! | `yaml` | logged, no metadata |
//! | none / unknown | JSON then YAML, logged, no metadata |
//!
//! Only mappings count as metadata. A document that parses to a scalar,
//! list or null yields no metadata under every hint.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::constants::{FORMAT_JSON, FORMAT_YAML};
use crate::core::{MetadataError, Result};

/// Ordered top-level metadata fields.
pub type ParsedMetadata = Map<String, Value>;

/// Parse `text` according to `hint`.
///
/// # Errors
///
/// Only when `hint` is `json` and the text is not valid JSON.
pub fn parse_metadata(text: &str, hint: Option<&str>) -> Result<Option<ParsedMetadata>> {
    match hint {
        Some(FORMAT_JSON) => Ok(into_mapping(parse_json(text)?, FORMAT_JSON)),
        Some(FORMAT_YAML) => match parse_yaml(text) {
            Ok(value) => Ok(into_mapping(value, FORMAT_YAML)),
            Err(e) => {
                warn!("Failed to parse YAML: {}", e);
                Ok(None)
            }
        },
        other => {
            if let Some(tag) = other {
                debug!("Unknown metadata format '{}'; detecting it instead", tag);
            }
            Ok(parse_detected(text))
        }
    }
}

/// Strict JSON parse.
pub fn parse_json(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|source| MetadataError::InvalidJson { source })
}

/// YAML parse into a JSON-compatible value.
pub fn parse_yaml(text: &str) -> std::result::Result<Value, serde_yaml::Error> {
    serde_yaml::from_str(text)
}

/// JSON first, YAML second; never fails.
fn parse_detected(text: &str) -> Option<ParsedMetadata> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => return into_mapping(value, FORMAT_JSON),
        Err(e) => debug!("Metadata is not JSON ({}); trying YAML", e),
    }

    match parse_yaml(text) {
        Ok(value) => into_mapping(value, FORMAT_YAML),
        Err(e) => {
            debug!("Metadata is not YAML either: {}", e);
            None
        }
    }
}

fn into_mapping(value: Value, format: &str) -> Option<ParsedMetadata> {
    match value {
        Value::Object(map) => Some(map),
        Value::Null => None,
        other => {
            debug!("Ignoring {} metadata that is not a mapping: {}", format, kind_of(&other));
            None
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
