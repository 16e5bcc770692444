//! Error types for CiteRank
//!
//! Provides the error taxonomy shared by graph construction and ranking:
//! - Distinct error types for different failure modes
//! - Error codes for machine-readable identification
//!
//! Data-quality anomalies (unknown or self-referencing citations) and
//! convergence shortfalls are not errors; they are reported through
//! graph statistics and solver diagnostics instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Input errors (1xxx)
    EmptyGraph,
    InvalidConfiguration,
    InvalidInput,
    InconsistentSnapshot,

    // Environment errors (9xxx)
    IoError,
    SerializationError,
    ConfigurationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Input (1xxx)
            ErrorCode::EmptyGraph => 1001,
            ErrorCode::InvalidConfiguration => 1002,
            ErrorCode::InvalidInput => 1003,
            ErrorCode::InconsistentSnapshot => 1004,

            // Environment (9xxx)
            ErrorCode::IoError => 9001,
            ErrorCode::SerializationError => 9002,
            ErrorCode::ConfigurationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Graph has no nodes")]
    EmptyGraph,

    #[error("Invalid PageRank configuration: {message}")]
    InvalidConfig {
        message: String,
        field: Option<String>,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Inconsistent graph snapshot: {message}")]
    InconsistentSnapshot { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::EmptyGraph => ErrorCode::EmptyGraph,
            AppError::InvalidConfig { .. } => ErrorCode::InvalidConfiguration,
            AppError::InvalidInput { .. } => ErrorCode::InvalidInput,
            AppError::InconsistentSnapshot { .. } => ErrorCode::InconsistentSnapshot,
            AppError::Io(_) => ErrorCode::IoError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
        }
    }

    /// Check if the caller supplied something unusable (as opposed to an
    /// environment failure such as a missing file)
    pub fn is_input_error(&self) -> bool {
        self.code().as_code() < 9000
    }
}

impl From<::config::ConfigError> for AppError {
    fn from(err: ::config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let field = err.field_errors().keys().next().map(|k| k.to_string());
        AppError::InvalidConfig {
            message: err.to_string(),
            field,
        }
    }
}
