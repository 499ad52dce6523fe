//! Error types for the redaction engine.

use thiserror::Error;

/// Result type for redaction operations.
pub type Result<T> = std::result::Result<T, RedactionError>;

/// Errors that can occur while loading or compiling a redaction policy.
///
/// Classification and redaction themselves are total and never fail.
#[derive(Error, Debug)]
pub enum RedactionError {
    /// The policy is structurally valid JSON but semantically unusable.
    #[error("policy error: {0}")]
    PolicyError(String),

    /// A custom rule's regex failed to compile.
    #[error("pattern error in rule '{rule}': {message}")]
    PatternError { rule: String, message: String },

    /// I/O error while reading or writing a policy file.
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl RedactionError {
    pub(crate) fn policy(message: impl Into<String>) -> Self {
        RedactionError::PolicyError(message.into())
    }
}
