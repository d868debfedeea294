//! Domain-specific error types for the script generator.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Library code returns typed errors while command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ConfigError
//! ├── UnknownField / Malformed / OutOfDomain - bad input
//! ├── Serialize                              - configuration dump failed
//! ├── Io                                     - configuration file unreadable
//! └── Dependency(DependencyError)            - a fragment rule is violated
//! OutputError                                - writing a document failed
//! PromptError                                - the question flow could not finish
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise while turning raw input into a validated configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The input names a field the configuration does not have.
    #[error("unknown configuration field '{field}' (valid fields: {})", crate::config::FIELD_NAMES.join(", "))]
    UnknownField {
        /// The offending key, as written in the input.
        field: String,
    },

    /// The input is not a JSON object of correctly typed values.
    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The configuration could not be turned into JSON.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[source] serde_json::Error),

    /// An enumerated field holds a value outside its domain.
    #[error("configuration field '{field}' must be one of {allowed}, got {value}")]
    OutOfDomain {
        /// Name of the enumerated field.
        field: &'static str,
        /// The rejected value.
        value: i64,
        /// Human-readable list of accepted values.
        allowed: &'static str,
    },

    /// A configuration file could not be read.
    #[error("failed to read configuration file {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The values are individually legal but violate a fragment rule.
    #[error("invalid combination: {0}")]
    Dependency(#[from] DependencyError),
}

impl ConfigError {
    /// Configuration fields the error points at, if it can name any.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::UnknownField { field } => vec![field.as_str()],
            Self::OutOfDomain { field, .. } => vec![*field],
            Self::Dependency(e) => e.fields().to_vec(),
            Self::Malformed(_) | Self::Serialize(_) | Self::Io { .. } => Vec::new(),
        }
    }
}

/// Errors raised by the dependency resolver when the selected fragments do
/// not form a consistent script.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyError {
    /// A selected fragment needs another fragment that was not selected.
    #[error("'{fragment}' requires '{required}' (check {})", .fields.join(" and "))]
    MissingRequirement {
        /// Name of the selected fragment.
        fragment: &'static str,
        /// Name of the fragment it needs.
        required: &'static str,
        /// Configuration fields that select either fragment.
        fields: Vec<&'static str>,
    },

    /// Two fragments that exclude each other were both selected.
    #[error("'{first}' conflicts with '{second}' (check {})", .fields.join(" and "))]
    Conflict {
        /// Name of the fragment declaring the conflict.
        first: &'static str,
        /// Name of the conflicting fragment.
        second: &'static str,
        /// Configuration fields that select either fragment.
        fields: Vec<&'static str>,
    },
}

impl DependencyError {
    /// Configuration fields involved in the violated rule.
    #[must_use]
    pub fn fields(&self) -> &[&'static str] {
        match self {
            Self::MissingRequirement { fields, .. } | Self::Conflict { fields, .. } => fields,
        }
    }
}

/// Errors that arise while persisting generated documents.
#[derive(Error, Debug)]
pub enum OutputError {
    /// A document or configuration dump could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// Destination that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Writing to standard output failed.
    #[error("failed to write to standard output: {0}")]
    Stdout(#[source] std::io::Error),

    /// The configuration dump could not be produced.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors that end the interactive question flow.
#[derive(Error, Debug)]
pub enum PromptError {
    /// Input ended before every question was answered.
    #[error("input closed before all questions were answered")]
    Closed,

    /// Reading answers or writing questions failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The answers cannot be turned into a configuration by asking again.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
