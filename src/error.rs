//! Error types for the football ETL pipeline
//!
//! Every fallible operation returns `Result<T, Error>`. Variants are grouped by
//! the four failure classes the pipeline distinguishes; [`Error::category`]
//! maps any variant back to its class.

use crate::types::{ResourceKind, Table};
use thiserror::Error;

/// The main error type for the pipeline
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Source Errors
    // ============================================================================
    #[error("Source unavailable for {resource} of '{competition}': {message}")]
    SourceUnavailable {
        resource: ResourceKind,
        competition: String,
        status: Option<u16>,
        message: String,
    },

    // ============================================================================
    // Data Contract Errors
    // ============================================================================
    #[error("Schema mismatch in {resource} document: {message}")]
    SchemaMismatch {
        resource: ResourceKind,
        message: String,
    },

    // ============================================================================
    // Sink Errors
    // ============================================================================
    #[error("Sink unavailable for table '{table}': {message}")]
    SinkUnavailable { table: String, message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Failure class of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing or invalid configuration; fatal before any competition runs
    Configuration,
    /// Network, timeout or non-2xx response from the data provider
    SourceUnavailable,
    /// A document's top-level container has the wrong shape
    SchemaMismatch,
    /// A warehouse or file write failed
    SinkUnavailable,
    /// Local I/O or encoding failure outside the pipeline stages
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Configuration => "ConfigurationError",
            Self::SourceUnavailable => "SourceUnavailable",
            Self::SchemaMismatch => "SchemaMismatch",
            Self::SinkUnavailable => "SinkUnavailable",
            Self::Internal => "Internal",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a source error without an HTTP status
    pub fn source(
        resource: ResourceKind,
        competition: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::SourceUnavailable {
            resource,
            competition: competition.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Create a source error for a non-2xx response
    pub fn source_status(
        resource: ResourceKind,
        competition: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        Self::SourceUnavailable {
            resource,
            competition: competition.into(),
            status: Some(status),
            message: format!("HTTP {status}: {}", excerpt(&body.into())),
        }
    }

    /// Create a schema mismatch error
    pub fn schema_mismatch(resource: ResourceKind, message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            resource,
            message: message.into(),
        }
    }

    /// Create a sink error
    pub fn sink(table: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::SinkUnavailable {
            table: table.to_string(),
            message: message.into(),
        }
    }

    /// Create a sink error for a write that isn't tied to one table
    pub fn sink_setup(message: impl Into<String>) -> Self {
        Self::sink("*", message)
    }

    /// Classify this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. }
            | Error::YamlParse(_)
            | Error::InvalidUrl(_) => ErrorCategory::Configuration,
            Error::SourceUnavailable { .. } => ErrorCategory::SourceUnavailable,
            Error::SchemaMismatch { .. } => ErrorCategory::SchemaMismatch,
            Error::SinkUnavailable { .. } => ErrorCategory::SinkUnavailable,
            Error::Io(_) | Error::JsonParse(_) => ErrorCategory::Internal,
        }
    }

    /// Check if this error prevents the run from starting at all
    pub fn is_configuration(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }
}

/// Shorthand used when a sink write fails for a specific table
pub(crate) fn sink_err<E: std::fmt::Display>(table: Table) -> impl FnOnce(E) -> Error {
    move |e| Error::sink(table, e.to_string())
}

const BODY_EXCERPT_CHARS: usize = 200;

/// First characters of a response body, trimmed
fn excerpt(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= BODY_EXCERPT_CHARS {
        return body.to_string();
    }
    let mut cut: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
    cut.push_str("...");
    cut
}

/// Result type alias for the pipeline
pub type Result<T> = std::result::Result<T, Error>;
