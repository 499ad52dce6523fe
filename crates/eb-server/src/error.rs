//! Error types for the echo server.

use thiserror::Error;

/// Startup and lifecycle failures.
#[derive(Error, Debug)]
pub enum ServeError {
    #[error("configuration error: {0}")]
    Config(#[from] eb_config::ValidationError),

    #[error("redaction policy error: {0}")]
    Policy(#[from] eb_redact::RedactionError),

    #[error("failed to bind {addr}: {message}")]
    Bind { addr: String, message: String },

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Per-request failures that turn into a JSON error envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EchoError {
    #[error("missing host header")]
    MissingHost,

    #[error("invalid request url: {0}")]
    InvalidUrl(String),

    #[error("request body too large (limit {limit} bytes)")]
    BodyTooLarge { limit: u64 },

    #[error("invalid request")]
    ReservedHostname,

    #[error("internal server error")]
    Internal,
}

impl EchoError {
    /// HTTP status code for this failure.
    pub fn status(&self) -> u16 {
        match self {
            EchoError::MissingHost | EchoError::InvalidUrl(_) | EchoError::ReservedHostname => 400,
            EchoError::BodyTooLarge { .. } => 413,
            EchoError::Internal => 500,
        }
    }
}
