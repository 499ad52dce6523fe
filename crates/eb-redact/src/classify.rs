//! Hostname classification.
//!
//! A hostname is redacted when one of its dot-separated labels equals a
//! redacted marker and none equals a not-redacted marker. Matching is by
//! whole label, so `notr` can never be mistaken for `r`.

use crate::policy::HostnameRules;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Outcome of classifying a hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostClass {
    /// A redacted marker label is present and no not-redacted marker is.
    Redacted,
    /// A not-redacted marker label is present.
    NotRedacted,
    /// No marker label at all.
    Unmarked,
}

impl HostClass {
    /// Whether responses for this class must be scrubbed.
    pub fn should_redact(&self) -> bool {
        matches!(self, HostClass::Redacted)
    }
}

impl std::fmt::Display for HostClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HostClass::Redacted => "redacted",
            HostClass::NotRedacted => "not_redacted",
            HostClass::Unmarked => "unmarked",
        };
        write!(f, "{}", s)
    }
}

/// Classifies hostnames against the policy's marker labels.
#[derive(Debug, Clone)]
pub struct HostnameClassifier {
    redacted: HashSet<String>,
    not_redacted: HashSet<String>,
}

impl HostnameClassifier {
    pub fn new(rules: &HostnameRules) -> Self {
        Self {
            redacted: rules
                .redacted_markers
                .iter()
                .map(|m| m.to_ascii_lowercase())
                .collect(),
            not_redacted: rules
                .not_redacted_markers
                .iter()
                .map(|m| m.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Classify a hostname. Case and a single trailing dot are ignored.
    pub fn classify(&self, hostname: &str) -> HostClass {
        let hostname = hostname.strip_suffix('.').unwrap_or(hostname);
        let lowered = hostname.to_ascii_lowercase();

        let mut saw_redacted = false;
        for label in lowered.split('.') {
            if self.not_redacted.contains(label) {
                return HostClass::NotRedacted;
            }
            if self.redacted.contains(label) {
                saw_redacted = true;
            }
        }

        if saw_redacted {
            HostClass::Redacted
        } else {
            HostClass::Unmarked
        }
    }

    /// Whether the hostname requires redaction.
    pub fn is_redacted(&self, hostname: &str) -> bool {
        self.classify(hostname).should_redact()
    }
}

impl Default for HostnameClassifier {
    fn default() -> Self {
        Self::new(&HostnameRules::default())
    }
}
