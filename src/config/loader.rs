//! JSON loading and dumping of generator configurations.
use std::path::Path;

use serde::Serialize as _;
use serde_json::{Map, Value};

use super::{FIELD_NAMES, RawConfig};
use crate::error::ConfigError;

/// Parse a JSON object into a [`RawConfig`].
///
/// Keys are checked against [`FIELD_NAMES`] first so that a typo is reported
/// by name rather than as a generic parse failure. Missing keys take the
/// batch-mode defaults.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownField`] for an unexpected key and
/// [`ConfigError::Malformed`] for invalid JSON or a mistyped value.
pub fn parse(text: &str) -> Result<RawConfig, ConfigError> {
    let object: Map<String, Value> = serde_json::from_str(text)?;
    if let Some(field) = object.keys().find(|k| !FIELD_NAMES.contains(&k.as_str())) {
        return Err(ConfigError::UnknownField {
            field: field.clone(),
        });
    }
    Ok(serde_json::from_value(Value::Object(object))?)
}

/// Load a configuration from inline JSON or from a file.
///
/// An argument whose first non-blank character is `{` is parsed as JSON
/// directly; anything else is treated as a path.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, or any error from
/// [`parse`].
pub fn load(path_or_json: &str) -> Result<RawConfig, ConfigError> {
    if path_or_json.trim_start().starts_with('{') {
        tracing::debug!(
            "parsing inline configuration ({} characters)",
            path_or_json.len()
        );
        return parse(path_or_json);
    }

    let path = Path::new(path_or_json);
    tracing::debug!("loading configuration from {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}

/// Serialize a configuration as pretty JSON using `indent` spaces per level.
///
/// # Errors
///
/// Returns [`ConfigError::Serialize`] if serialization fails.
pub fn to_json(raw: &RawConfig, indent: usize) -> Result<String, ConfigError> {
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    raw.serialize(&mut serializer).map_err(ConfigError::Serialize)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
