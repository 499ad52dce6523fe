//! Where the log filter and format come from.
//!
//! Filter precedence: `--log-level`, then the raw directives in
//! `ECHOBACK_LOG`, then `RUST_LOG`, then `info`. Format precedence:
//! `--log-format`, then `ECHOBACK_LOG_FORMAT`, then human.

use clap::ValueEnum;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

pub const ENV_LOG: &str = "ECHOBACK_LOG";
pub const ENV_RUST_LOG: &str = "RUST_LOG";
pub const ENV_LOG_FORMAT: &str = "ECHOBACK_LOG_FORMAT";

const DEFAULT_DIRECTIVES: &str = "info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per line.
    #[value(alias = "json")]
    Jsonl,
}

/// Level accepted by `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

/// Which input decided the filter directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSource {
    Cli,
    EchobackLog,
    RustLog,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive string, e.g. `info` or `eb_server=debug,warn`.
    pub directives: String,
    pub source: FilterSource,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            directives: DEFAULT_DIRECTIVES.to_string(),
            source: FilterSource::Default,
        }
    }
}

impl LogConfig {
    /// Resolve against the process environment.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), cli_level, cli_format)
    }

    /// Resolve against an arbitrary variable lookup.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
    ) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let (directives, source) = if let Some(level) = cli_level {
            (LevelFilter::from(level).to_string(), FilterSource::Cli)
        } else if let Some(raw) = non_empty(ENV_LOG) {
            (raw, FilterSource::EchobackLog)
        } else if let Some(raw) = non_empty(ENV_RUST_LOG) {
            (raw, FilterSource::RustLog)
        } else {
            (DEFAULT_DIRECTIVES.to_string(), FilterSource::Default)
        };

        // An unparseable env format falls back to human output.
        let format = cli_format
            .or_else(|| {
                non_empty(ENV_LOG_FORMAT).and_then(|v| LogFormat::from_str(v.trim(), true).ok())
            })
            .unwrap_or_default();

        LogConfig {
            format,
            directives: directives.trim().to_string(),
            source,
        }
    }

    /// Build the filter. Invalid directives are skipped; with none left the
    /// filter defaults to `info`.
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .parse_lossy(&self.directives)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = LogConfig::from_lookup(lookup(&[]), None, None);
        assert_eq!(config, LogConfig::default());
    }

    #[test]
    fn test_cli_level_beats_echoback_log() {
        let config = LogConfig::from_lookup(
            lookup(&[(ENV_LOG, "error"), (ENV_RUST_LOG, "trace")]),
            Some(LogLevel::Debug),
            None,
        );
        assert_eq!(config.source, FilterSource::Cli);
        assert_eq!(config.directives, "debug");
    }

    #[test]
    fn test_echoback_log_beats_rust_log() {
        let config = LogConfig::from_lookup(
            lookup(&[(ENV_LOG, "eb_server=debug,warn"), (ENV_RUST_LOG, "trace")]),
            None,
            None,
        );
        assert_eq!(config.source, FilterSource::EchobackLog);
        assert_eq!(config.directives, "eb_server=debug,warn");
    }

    #[test]
    fn test_rust_log_used_verbatim() {
        let config = LogConfig::from_lookup(
            lookup(&[(ENV_RUST_LOG, "echoback::request=trace")]),
            None,
            None,
        );
        assert_eq!(config.source, FilterSource::RustLog);
        assert_eq!(config.directives, "echoback::request=trace");
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let config = LogConfig::from_lookup(
            lookup(&[(ENV_LOG, "  "), (ENV_RUST_LOG, "warn")]),
            None,
            None,
        );
        assert_eq!(config.source, FilterSource::RustLog);
    }

    #[test]
    fn test_format_precedence() {
        let env = lookup(&[(ENV_LOG_FORMAT, "JSON")]);
        assert_eq!(LogConfig::from_lookup(&env, None, None).format, LogFormat::Jsonl);
        assert_eq!(
            LogConfig::from_lookup(&env, None, Some(LogFormat::Human)).format,
            LogFormat::Human
        );

        let bogus = lookup(&[(ENV_LOG_FORMAT, "xml")]);
        assert_eq!(LogConfig::from_lookup(bogus, None, None).format, LogFormat::Human);
    }
}
