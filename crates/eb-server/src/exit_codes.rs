//! Exit codes for the echoback CLI.
//!
//! Exit code ranges:
//! - 0-9: Success/operational outcomes
//! - 10-19: User/environment errors (recoverable by user action)
//! - 20-29: Internal errors (bugs, should be reported)

/// Exit codes for echoback operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Clean = 0,

    /// `classify`: the host is redacted.
    Redacted = 1,

    /// Invalid arguments (e.g. unparseable URL).
    ArgsError = 10,

    /// Configuration file missing, malformed or invalid.
    ConfigError = 11,

    /// Redaction policy missing, malformed or invalid.
    PolicyError = 12,

    /// Could not bind the listen address.
    BindError = 13,

    /// Internal error (bug - please report).
    InternalError = 20,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::Redacted => "OK_REDACTED",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::PolicyError => "ERR_POLICY",
            ExitCode::BindError => "ERR_BIND",
            ExitCode::InternalError => "ERR_INTERNAL",
        }
    }
}

impl From<&crate::error::ServeError> for ExitCode {
    fn from(err: &crate::error::ServeError) -> Self {
        use crate::error::ServeError;
        match err {
            ServeError::Config(_) => ExitCode::ConfigError,
            ServeError::Policy(_) => ExitCode::PolicyError,
            ServeError::Bind { .. } => ExitCode::BindError,
            ServeError::Spawn(_) => ExitCode::InternalError,
        }
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
