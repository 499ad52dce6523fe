//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG paths → /etc → defaults.

use std::path::{Path, PathBuf};

use crate::server::ServerConfig;
use crate::validate::{validate_config, ValidationError, ValidationResult};

/// Discovered configuration file path.
#[derive(Debug, Clone, Default)]
pub struct ConfigPath {
    /// Path to echoback.toml (or None if not found).
    pub path: Option<PathBuf>,

    /// Where the file was found (for diagnostics).
    pub source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/echoback/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "ECHOBACK_CONFIG";
pub const ENV_CONFIG_DIR: &str = "ECHOBACK_CONFIG_DIR";
pub const ENV_BIND: &str = "ECHOBACK_BIND";
pub const ENV_PORT: &str = "ECHOBACK_PORT";

/// Standard config file name.
pub const CONFIG_FILENAME: &str = "echoback.toml";

/// Application name for XDG directories.
const APP_NAME: &str = "echoback";

/// Resolve the configuration file path.
///
/// Resolution order:
/// 1. Explicit CLI path (used even if missing, so the read error surfaces)
/// 2. ECHOBACK_CONFIG environment variable
/// 3. ECHOBACK_CONFIG_DIR environment variable + echoback.toml
/// 4. XDG config directory (~/.config/echoback/)
/// 5. System config (/etc/echoback/)
/// 6. Built-in defaults (None)
pub fn resolve_config(cli_path: Option<&Path>) -> ConfigPath {
    // 1. CLI argument
    if let Some(path) = cli_path {
        return found(path.to_path_buf(), ConfigSource::CliArgument);
    }

    // 2. Environment variable (direct path)
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return found(path, ConfigSource::Environment);
        }
    }

    // 3. Environment variable (config dir)
    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(CONFIG_FILENAME);
        if path.exists() {
            return found(path, ConfigSource::Environment);
        }
    }

    // 4. XDG config directory
    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(CONFIG_FILENAME);
        if path.exists() {
            return found(path, ConfigSource::XdgConfig);
        }
    }

    // 5. System config
    let system_path = system_config_dir().join(CONFIG_FILENAME);
    if system_path.exists() {
        return found(system_path, ConfigSource::SystemConfig);
    }

    // 6. Built-in default
    ConfigPath::default()
}

fn found(path: PathBuf, source: ConfigSource) -> ConfigPath {
    ConfigPath {
        path: Some(path),
        source,
    }
}

/// Get the XDG config directory for echoback.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}

/// Apply ECHOBACK_BIND / ECHOBACK_PORT on top of file values.
pub fn apply_env_overrides(config: &mut ServerConfig) -> ValidationResult<()> {
    if let Ok(bind) = std::env::var(ENV_BIND) {
        if !bind.trim().is_empty() {
            config.bind = bind.trim().to_string();
        }
    }

    if let Ok(port) = std::env::var(ENV_PORT) {
        config.port = port
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidValue {
                field: ENV_PORT.to_string(),
                message: format!("'{}' is not a port number", port),
            })?;
    }

    Ok(())
}

/// A loaded configuration and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ServerConfig,
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Resolve, read, override from the environment, and validate.
///
/// CLI flag overrides are the caller's job and must be re-validated with
/// [`validate_config`] afterwards.
pub fn load_config(cli_path: Option<&Path>) -> ValidationResult<LoadedConfig> {
    let resolved = resolve_config(cli_path);

    let mut config = match resolved.path {
        Some(ref path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    validate_config(&config)?;

    Ok(LoadedConfig {
        config,
        path: resolved.path,
        source: resolved.source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::CliArgument), "CLI argument");
        assert_eq!(
            format!("{}", ConfigSource::Environment),
            "environment variable"
        );
        assert_eq!(format!("{}", ConfigSource::XdgConfig), "XDG config");
        assert_eq!(format!("{}", ConfigSource::SystemConfig), "system config");
        assert_eq!(
            format!("{}", ConfigSource::BuiltinDefault),
            "builtin default"
        );
    }

    #[test]
    fn test_cli_path_wins_even_when_missing() {
        let resolved = resolve_config(Some(Path::new("/nonexistent/echoback.toml")));
        assert_eq!(resolved.source, ConfigSource::CliArgument);
        assert_eq!(
            resolved.path,
            Some(PathBuf::from("/nonexistent/echoback.toml"))
        );
    }

    #[test]
    fn test_load_missing_cli_path_is_io_error() {
        let err = load_config(Some(Path::new("/nonexistent/echoback.toml"))).unwrap_err();
        assert!(matches!(err, ValidationError::IoError(_)));
        assert_eq!(err.code(), 60);
    }

    #[test]
    fn test_system_config_dir() {
        assert_eq!(system_config_dir(), PathBuf::from("/etc/echoback"));
    }
}
