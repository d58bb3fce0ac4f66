//! Error types for citeorder
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for different failure modes
//! - Process exit code mapping
//! - Error codes for machine-readable reporting

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    InvalidArgument,
    InvalidPattern,
    MissingColumn,
    UnsupportedFormat,

    // Resource errors (4xxx)
    FileNotFound,

    // I/O errors (7xxx)
    IoError,
    CsvError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::InvalidArgument => 1001,
            ErrorCode::InvalidPattern => 1002,
            ErrorCode::MissingColumn => 1003,
            ErrorCode::UnsupportedFormat => 1004,

            // Resources (4xxx)
            ErrorCode::FileNotFound => 4001,

            // I/O (7xxx)
            ErrorCode::IoError => 7001,
            ErrorCode::CsvError => 7002,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Invalid argument `{argument}`: {message}")]
    InvalidArgument { argument: String, message: String },

    #[error("Invalid citation pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Required column missing: {column}")]
    MissingColumn { column: String },

    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    // Resource errors
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Internal errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Shorthand for an `InvalidArgument` error
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            AppError::InvalidPattern { .. } => ErrorCode::InvalidPattern,
            AppError::MissingColumn { .. } => ErrorCode::MissingColumn,
            AppError::UnsupportedFormat { .. } => ErrorCode::UnsupportedFormat,
            AppError::FileNotFound { .. } => ErrorCode::FileNotFound,
            AppError::Io(_) => ErrorCode::IoError,
            AppError::Csv(_) => ErrorCode::CsvError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Check if this error was caused by the caller's input rather than the environment
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidArgument { .. }
                | AppError::InvalidPattern { .. }
                | AppError::MissingColumn { .. }
                | AppError::UnsupportedFormat { .. }
                | AppError::FileNotFound { .. }
        )
    }

    /// Process exit code: 2 for usage errors, 1 for everything else
    pub fn exit_code(&self) -> i32 {
        if self.is_user_error() { 2 } else { 1 }
    }

    /// Log the error at a level matching its severity
    pub fn log(&self) {
        let code = self.code();
        if self.is_user_error() {
            tracing::warn!(
                error = %self,
                code = ?code,
                numeric_code = code.as_code(),
                "Invalid input"
            );
        } else {
            tracing::error!(
                error = %self,
                code = ?code,
                numeric_code = code.as_code(),
                "Analysis failed"
            );
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string()
        }
    }
}
