use std::path::PathBuf;

use thiserror::Error;

use crate::types::Scope;

#[derive(Debug, Error)]
pub enum TstoyError {
    #[error("The scope isn't defined: settings must target the 'machine' or 'user' scope")]
    UndefinedScope,

    #[error("Invalid update frequency ({value}): must be between 1 and 90 days, or 0 to leave it unset")]
    InvalidFrequency { value: i64 },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Invalid settings input: {source}")]
    InvalidInput { source: serde_json::Error },

    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Malformed config file {path}: {reason}")]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("Failed to {operation} {path}: {source}")]
    IoError {
        operation: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not determine the {0} configuration directory for this platform")]
    NoConfigDir(Scope),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] confique::Error),
}

impl TstoyError {
    /// True for errors raised by settings validation, before any I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TstoyError::UndefinedScope | TstoyError::InvalidFrequency { .. }
        )
    }
}

/// Failure to parse one of the string-coded value types.
///
/// Kept separate from [`TstoyError`] so that it is `Send + Sync` and can back
/// a clap value parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to convert '{value}' to a valid {key}, must be {expected}")]
pub struct ParseValueError {
    pub key: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl From<ParseValueError> for TstoyError {
    fn from(err: ParseValueError) -> Self {
        TstoyError::InvalidValue {
            key: err.key.to_string(),
            reason: err.to_string(),
        }
    }
}
