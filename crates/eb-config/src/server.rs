//! Typed server configuration (`echoback.toml`).

use crate::validate::ValidationError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

/// Top-level server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Port to listen on. 0 picks an ephemeral port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of request-handling threads.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Scheme used to rebuild the absolute request URL (`http` or `https`).
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Largest request body that will be echoed.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,

    /// Optional redaction policy JSON file. Built-in rules when absent.
    #[serde(default)]
    pub redaction_policy: Option<PathBuf>,

    /// Reserved hostname routing.
    #[serde(default)]
    pub routing: RoutingConfig,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_workers() -> usize {
    4
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_max_body_bytes() -> u64 {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            workers: default_workers(),
            scheme: default_scheme(),
            max_body_bytes: default_max_body_bytes(),
            redaction_policy: None,
            routing: RoutingConfig::default(),
        }
    }
}

/// Hostnames under the apex that are reserved for docs/marketing pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Apex domain the service runs under.
    #[serde(default = "default_apex_domain")]
    pub apex_domain: String,

    /// Labels directly under the apex that are never echoed.
    #[serde(default = "default_reserved_labels")]
    pub reserved_labels: Vec<String>,

    /// Where `GET /` on a reserved hostname is redirected.
    #[serde(default = "default_canonical_root")]
    pub canonical_root: String,
}

fn default_apex_domain() -> String {
    "echoback.dev".to_string()
}

fn default_reserved_labels() -> Vec<String> {
    vec!["docs".to_string(), "about".to_string(), "www".to_string()]
}

fn default_canonical_root() -> String {
    "https://echoback.dev/".to_string()
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            apex_domain: default_apex_domain(),
            reserved_labels: default_reserved_labels(),
            canonical_root: default_canonical_root(),
        }
    }
}

impl RoutingConfig {
    /// Fully qualified reserved hostnames, e.g. `docs.echoback.dev`.
    pub fn reserved_hostnames(&self) -> Vec<String> {
        self.reserved_labels
            .iter()
            .map(|label| format!("{}.{}", label, self.apex_domain))
            .collect()
    }

    /// Whether `hostname` (any case, optional trailing dot) is reserved.
    pub fn is_reserved(&self, hostname: &str) -> bool {
        let hostname = hostname.strip_suffix('.').unwrap_or(hostname);
        let Some((label, rest)) = hostname.split_once('.') else {
            return false;
        };
        rest.eq_ignore_ascii_case(&self.apex_domain)
            && self
                .reserved_labels
                .iter()
                .any(|reserved| reserved.eq_ignore_ascii_case(label))
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse_toml(content: &str) -> Result<Self, ValidationError> {
        toml::from_str(content).map_err(|e| ValidationError::ParseError(e.to_string()))
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String, ValidationError> {
        toml::to_string_pretty(self).map_err(|e| ValidationError::ParseError(e.to_string()))
    }

    /// The socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        let ip: IpAddr = self.bind.parse().map_err(|_| ValidationError::InvalidValue {
            field: "bind".to_string(),
            message: format!("'{}' is not an IP address", self.bind),
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
