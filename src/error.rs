//! Error types for formgate
//!
//! Validation failures are never errors: they are carried as [`FieldErrors`]
//! data. The variants here cover misuse of the API and environment failures.
//!
//! [`FieldErrors`]: crate::domain::FieldErrors

use thiserror::Error;

/// Errors that can occur while building schemas or driving a form
#[derive(Debug, Error)]
pub enum FormError {
    /// Field is not part of the form's declared field set
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Schema definition could not be compiled
    #[error("Invalid schema for {field}: {reason}")]
    InvalidSchema { field: String, reason: String },

    /// Named schema or `$ref` target does not exist
    #[error("Schema not found: {0}")]
    SchemaNotFound(String),

    /// Submission task panicked or was aborted
    #[error("Submission action failed: {0}")]
    ActionFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for FormError {
    fn from(err: config::ConfigError) -> Self {
        FormError::Config(err.to_string())
    }
}

impl From<tokio::task::JoinError> for FormError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            FormError::ActionFailed("submission action panicked".to_string())
        } else {
            FormError::ActionFailed(err.to_string())
        }
    }
}

/// Result type alias for form operations
pub type FormResult<T> = Result<T, FormError>;
