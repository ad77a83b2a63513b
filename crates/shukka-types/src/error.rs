//! Error types for shukka

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A field failed validation; nothing was written
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Branch digit would pass 9
    #[error("No branch number left for contract {0}")]
    BranchExhausted(String),

    /// Sequence would pass 9999 for the year
    #[error("No contract number left for year prefix {0}")]
    SequenceExhausted(String),

    /// Unique key already taken at the store
    #[error("{entity} already exists: {key}")]
    Conflict { entity: &'static str, key: String },

    #[error("Storage error on {entity} [{key}]: {message}")]
    Storage {
        entity: &'static str,
        key: String,
        message: String,
    },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Excel export error: {0}")]
    Excel(String),
}

impl Error {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Error::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn storage(entity: &'static str, key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Storage {
            entity,
            key: key.into(),
            message: message.into(),
        }
    }

    /// Whether this is the explicit "not found" outcome
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
