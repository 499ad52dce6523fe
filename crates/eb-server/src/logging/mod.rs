//! Structured logging for the echo server.
//!
//! - stdout is reserved for command payloads (JSON output of the CLI)
//! - stderr receives all log output (human or JSONL)
//! - request events carry a `request_id` for correlation
//! - values from redacted hostnames are logged only after redaction

pub mod config;

pub use config::{FilterSource, LogConfig, LogFormat, LogLevel};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::fmt;

/// Target of the per-request event.
pub const REQUEST_TARGET: &str = "echoback::request";

/// Standard event names used in logging.
pub mod event_names {
    pub const SERVER_STARTED: &str = "server.started";
    pub const SERVER_STOPPED: &str = "server.stopped";
    pub const REQUEST_ECHOED: &str = "request.echoed";
    pub const REQUEST_REDIRECTED: &str = "request.redirected";
    pub const REQUEST_REJECTED: &str = "request.rejected";
}

/// Initialize the logging subsystem.
///
/// Must be called once at startup before any logging occurs. A second call
/// is a no-op.
pub fn init_logging(config: &LogConfig) {
    let filter = config.filter();

    let result = match config.format {
        LogFormat::Human => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
        }
        LogFormat::Jsonl => {
            let json_layer = fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .try_init()
        }
    };

    if let Err(e) = result {
        eprintln!("logging already initialized: {}", e);
    }
}

/// Generate a unique ID for one request.
pub fn generate_request_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    // Shorten to first 12 hex chars for readability
    format!("req-{}", &uuid[..12])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_id() {
        let id1 = generate_request_id();
        let id2 = generate_request_id();

        assert!(id1.starts_with("req-"));
        assert_ne!(id1, id2);
        // Format: req-<12 hex chars>
        assert_eq!(id1.len(), 16);
        assert!(id1[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    fn enabled_under(config: &LogConfig, level: tracing::Level) -> bool {
        let subscriber = tracing_subscriber::registry().with(config.filter());
        tracing::subscriber::with_default(subscriber, || match level {
            tracing::Level::ERROR => tracing::enabled!(tracing::Level::ERROR),
            tracing::Level::WARN => tracing::enabled!(tracing::Level::WARN),
            tracing::Level::INFO => tracing::enabled!(tracing::Level::INFO),
            tracing::Level::DEBUG => tracing::enabled!(tracing::Level::DEBUG),
            _ => tracing::enabled!(tracing::Level::TRACE),
        })
    }

    fn config_from(vars: &[(&str, &str)], cli_level: Option<LogLevel>) -> LogConfig {
        LogConfig::from_lookup(
            |key| {
                vars.iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| v.to_string())
            },
            cli_level,
            None,
        )
    }

    #[test]
    fn test_cli_level_overrides_echoback_log_filter() {
        let config = config_from(&[(config::ENV_LOG, "error")], Some(LogLevel::Debug));
        assert!(enabled_under(&config, tracing::Level::DEBUG));
        assert!(!enabled_under(&config, tracing::Level::TRACE));
    }

    #[test]
    fn test_echoback_log_filter_applies_without_cli_level() {
        let config = config_from(
            &[(config::ENV_LOG, "error"), (config::ENV_RUST_LOG, "debug")],
            None,
        );
        assert!(enabled_under(&config, tracing::Level::ERROR));
        assert!(!enabled_under(&config, tracing::Level::WARN));
    }

    #[test]
    fn test_rust_log_filter_applies_last() {
        let config = config_from(&[(config::ENV_RUST_LOG, "warn")], None);
        assert!(enabled_under(&config, tracing::Level::WARN));
        assert!(!enabled_under(&config, tracing::Level::INFO));
    }

    #[test]
    fn test_garbage_directives_fall_back_to_info() {
        let config = config_from(&[(config::ENV_LOG, "=@@=")], None);
        assert!(enabled_under(&config, tracing::Level::INFO));
        assert!(!enabled_under(&config, tracing::Level::DEBUG));
    }

    #[test]
    fn test_cli_off_silences_everything() {
        let config = config_from(&[(config::ENV_LOG, "trace")], Some(LogLevel::Off));
        assert!(!enabled_under(&config, tracing::Level::ERROR));
    }

    #[test]
    fn test_init_logging_twice_is_harmless() {
        let config = config_from(&[], Some(LogLevel::Off));
        init_logging(&config);
        init_logging(&config);
    }
}
