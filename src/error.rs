//! Error Types
//!
//! Typed errors for the parts of the crate that can actually fail.
//! Validation failures and malformed payloads are not errors: the wizard
//! reports the former through its notifier and the projection degrades the
//! latter to an empty payload.

use thiserror::Error;

/// Problems found while turning a form definition into a wizard.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Form definition has no steps")]
    NoSteps,

    #[error("Duplicate field name: '{0}'")]
    DuplicateField(String),

    #[error("Step {step} ('{title}') references unknown field '{field}'")]
    UnknownField {
        step: usize,
        title: String,
        field: String,
    },

    #[error("Field '{field}' has an invalid pattern: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to read form definition '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse form definition: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Failures reported by an agent or record source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

/// Failures while loading the application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}
