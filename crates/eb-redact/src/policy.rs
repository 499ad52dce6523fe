//! Redaction policy configuration.
//!
//! Defines which hostname labels switch redaction on or off, and which
//! header names and query parameter keys carry sensitive values. The policy
//! is plain data; [`crate::RedactionEngine`] compiles it once at startup.

use crate::{RedactionError, Result, Surface};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Schema version for the policy file.
pub const POLICY_SCHEMA_VERSION: &str = "1.0.0";

// A single lower-case DNS label.
static RE_DNS_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$").unwrap());

/// Redaction policy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionPolicy {
    /// Schema version.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Hostname marker labels.
    #[serde(default)]
    pub hostnames: HostnameRules,

    /// Sensitive header name rules.
    #[serde(default)]
    pub headers: HeaderRules,

    /// Sensitive query parameter key rules.
    #[serde(default)]
    pub query_params: QueryParamRules,

    /// Extra regex rules, checked after the built-in tables.
    #[serde(default)]
    pub custom_rules: Vec<CustomRule>,
}

fn default_schema_version() -> String {
    POLICY_SCHEMA_VERSION.to_string()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Marker labels that decide whether a hostname is redacted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostnameRules {
    /// Any of these labels turns redaction on.
    #[serde(default = "default_redacted_markers")]
    pub redacted_markers: Vec<String>,

    /// Any of these labels keeps redaction off, even if a redacted marker
    /// is also present.
    #[serde(default = "default_not_redacted_markers")]
    pub not_redacted_markers: Vec<String>,
}

fn default_redacted_markers() -> Vec<String> {
    strings(&["redacted", "redact", "r"])
}

fn default_not_redacted_markers() -> Vec<String> {
    strings(&["notredacted", "notredact", "notr"])
}

impl Default for HostnameRules {
    fn default() -> Self {
        Self {
            redacted_markers: default_redacted_markers(),
            not_redacted_markers: default_not_redacted_markers(),
        }
    }
}

/// Header names considered sensitive. All comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderRules {
    /// Exact header names.
    #[serde(default = "default_header_exact")]
    pub exact: Vec<String>,

    /// Name suffixes (e.g. `-ip` catches `X-Some-IP`).
    #[serde(default = "default_header_suffixes")]
    pub suffixes: Vec<String>,

    /// Substrings anywhere in the name.
    #[serde(default = "default_header_substrings")]
    pub substrings: Vec<String>,
}

fn default_header_exact() -> Vec<String> {
    strings(&[
        "cf-connecting-ip",
        "x-real-ip",
        "x-forwarded-for",
        "cookie",
        "authorization",
    ])
}

fn default_header_suffixes() -> Vec<String> {
    strings(&["-ip"])
}

fn default_header_substrings() -> Vec<String> {
    strings(&["token", "key"])
}

impl Default for HeaderRules {
    fn default() -> Self {
        Self {
            exact: default_header_exact(),
            suffixes: default_header_suffixes(),
            substrings: default_header_substrings(),
        }
    }
}

/// Query parameter keys considered sensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParamRules {
    /// Exact keys, compared case-insensitively.
    #[serde(default = "default_param_exact")]
    pub exact: Vec<String>,

    /// Provider token prefixes, compared case-sensitively.
    #[serde(default = "default_param_prefixes")]
    pub prefixes: Vec<String>,
}

fn default_param_exact() -> Vec<String> {
    strings(&["key", "apikey", "api_key", "token"])
}

fn default_param_prefixes() -> Vec<String> {
    strings(&["sk_", "rk_", "ghu_", "ghp_", "gha_"])
}

impl Default for QueryParamRules {
    fn default() -> Self {
        Self {
            exact: default_param_exact(),
            prefixes: default_param_prefixes(),
        }
    }
}

/// Custom regex rule for a single surface.
///
/// Patterns are compiled case-insensitively and matched against the
/// header name or decoded query key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRule {
    /// Name of the rule, used in diagnostics.
    pub name: String,

    /// Surface the rule applies to.
    pub surface: Surface,

    /// Regex pattern.
    pub pattern: String,
}

impl RedactionPolicy {
    /// Create a new policy with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load policy from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse policy from a JSON string.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let policy: RedactionPolicy = serde_json::from_str(content)?;
        Ok(policy)
    }

    /// Save policy to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Custom rules for one surface, in declaration order.
    pub fn custom_rules_for(&self, surface: Surface) -> impl Iterator<Item = &CustomRule> {
        self.custom_rules
            .iter()
            .filter(move |rule| rule.surface == surface)
    }

    /// Semantic validation.
    ///
    /// Regex compilation of custom rules is checked when the engine is
    /// built, not here.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != POLICY_SCHEMA_VERSION {
            return Err(RedactionError::policy(format!(
                "unsupported schema version {} (expected {})",
                self.schema_version, POLICY_SCHEMA_VERSION
            )));
        }

        validate_markers("redacted_markers", &self.hostnames.redacted_markers)?;
        validate_markers("not_redacted_markers", &self.hostnames.not_redacted_markers)?;

        let redacted: HashSet<&str> = self
            .hostnames
            .redacted_markers
            .iter()
            .map(String::as_str)
            .collect();
        if let Some(both) = self
            .hostnames
            .not_redacted_markers
            .iter()
            .find(|m| redacted.contains(m.as_str()))
        {
            return Err(RedactionError::policy(format!(
                "marker '{}' is both redacted and not redacted",
                both
            )));
        }

        // An empty needle would match every name.
        validate_needles("headers.exact", &self.headers.exact)?;
        validate_needles("headers.suffixes", &self.headers.suffixes)?;
        validate_needles("headers.substrings", &self.headers.substrings)?;
        validate_needles("query_params.exact", &self.query_params.exact)?;
        validate_needles("query_params.prefixes", &self.query_params.prefixes)?;

        for rule in &self.custom_rules {
            if rule.name.trim().is_empty() {
                return Err(RedactionError::policy("custom rule with empty name"));
            }
            if rule.pattern.is_empty() {
                return Err(RedactionError::policy(format!(
                    "custom rule '{}' has an empty pattern",
                    rule.name
                )));
            }
        }

        Ok(())
    }
}

fn validate_markers(field: &str, markers: &[String]) -> Result<()> {
    for marker in markers {
        if !RE_DNS_LABEL.is_match(marker) {
            return Err(RedactionError::policy(format!(
                "hostnames.{}: '{}' is not a lower-case DNS label",
                field, marker
            )));
        }
    }
    Ok(())
}

fn validate_needles(field: &str, needles: &[String]) -> Result<()> {
    if needles.iter().any(|n| n.is_empty()) {
        return Err(RedactionError::policy(format!(
            "{} contains an empty entry",
            field
        )));
    }
    Ok(())
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        Self {
            schema_version: POLICY_SCHEMA_VERSION.to_string(),
            hostnames: HostnameRules::default(),
            headers: HeaderRules::default(),
            query_params: QueryParamRules::default(),
            custom_rules: Vec::new(),
        }
    }
}
