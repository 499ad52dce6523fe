//! Configuration validation errors and semantic validation.

use crate::server::{RoutingConfig, ServerConfig};
use thiserror::Error;
use url::Url;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Upper bound on worker threads.
pub const MAX_WORKERS: usize = 256;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
        }
    }

    fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validate server configuration semantically.
pub fn validate_config(config: &ServerConfig) -> ValidationResult<()> {
    config.socket_addr()?;

    if config.workers == 0 || config.workers > MAX_WORKERS {
        return Err(ValidationError::invalid(
            "workers",
            format!("Must be in [1, {}], got {}", MAX_WORKERS, config.workers),
        ));
    }

    if config.scheme != "http" && config.scheme != "https" {
        return Err(ValidationError::invalid(
            "scheme",
            format!("Must be 'http' or 'https', got '{}'", config.scheme),
        ));
    }

    if config.max_body_bytes == 0 {
        return Err(ValidationError::invalid(
            "max_body_bytes",
            "Must be greater than 0",
        ));
    }

    if let Some(ref path) = config.redaction_policy {
        if path.as_os_str().is_empty() {
            return Err(ValidationError::invalid(
                "redaction_policy",
                "Path must not be empty",
            ));
        }
    }

    validate_routing(&config.routing)
}

/// Validate reserved hostname routing.
pub fn validate_routing(routing: &RoutingConfig) -> ValidationResult<()> {
    if routing.apex_domain.is_empty()
        || !routing.apex_domain.split('.').all(is_dns_label)
    {
        return Err(ValidationError::invalid(
            "routing.apex_domain",
            format!("'{}' is not a lower-case domain name", routing.apex_domain),
        ));
    }

    for label in &routing.reserved_labels {
        if !is_dns_label(label) {
            return Err(ValidationError::invalid(
                "routing.reserved_labels",
                format!("'{}' is not a lower-case DNS label", label),
            ));
        }
    }

    let root = Url::parse(&routing.canonical_root).map_err(|e| {
        ValidationError::invalid("routing.canonical_root", format!("{}", e))
    })?;
    if root.scheme() != "http" && root.scheme() != "https" {
        return Err(ValidationError::invalid(
            "routing.canonical_root",
            format!("Scheme must be http or https, got '{}'", root.scheme()),
        ));
    }

    // Redirecting a reserved host to itself would loop forever.
    if let Some(host) = root.host_str() {
        if routing.is_reserved(host) {
            return Err(ValidationError::SemanticError(format!(
                "canonical_root host '{}' is itself reserved",
                host
            )));
        }
    }

    Ok(())
}

fn is_dns_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
