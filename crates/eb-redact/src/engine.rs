//! Main redaction engine.
//!
//! The RedactionEngine compiles a [`RedactionPolicy`] once and then answers
//! three questions per request: is this hostname redacted, what do the
//! headers look like after masking, and what does the URL look like after
//! masking. It holds no mutable state and is shared freely across threads.

use crate::classify::{HostClass, HostnameClassifier};
use crate::headers::{HeaderRedactor, HeaderSet};
use crate::query::QueryRedactor;
use crate::rules::RuleTable;
use crate::{RedactionPolicy, Result, Surface};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Result of a redaction operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redacted<T> {
    /// The redacted output.
    pub output: T,

    /// How many values were replaced by a sentinel.
    pub redacted: usize,
}

impl<T> Redacted<T> {
    pub fn new(output: T, redacted: usize) -> Self {
        Self { output, redacted }
    }

    /// Output that passed through without any replacement.
    pub fn untouched(output: T) -> Self {
        Self::new(output, 0)
    }

    /// Whether any value was replaced.
    pub fn was_modified(&self) -> bool {
        self.redacted > 0
    }

    pub fn into_inner(self) -> T {
        self.output
    }
}

/// The main redaction engine.
#[derive(Debug, Clone)]
pub struct RedactionEngine {
    policy: RedactionPolicy,
    classifier: HostnameClassifier,
    headers: HeaderRedactor,
    query: QueryRedactor,
}

impl RedactionEngine {
    /// Validate and compile a policy.
    pub fn new(policy: RedactionPolicy) -> Result<Self> {
        policy.validate()?;

        let classifier = HostnameClassifier::new(&policy.hostnames);
        let headers = RuleTable::for_headers(
            &policy.headers,
            policy.custom_rules_for(Surface::Header),
        )?;
        let query = RuleTable::for_query_params(
            &policy.query_params,
            policy.custom_rules_for(Surface::QueryParam),
        )?;

        Ok(Self {
            policy,
            classifier,
            headers: HeaderRedactor::new(headers),
            query: QueryRedactor::new(query),
        })
    }

    /// Load a policy file and compile it.
    pub fn load<P: AsRef<Path>>(policy_path: P) -> Result<Self> {
        let policy = RedactionPolicy::load(policy_path)?;
        Self::new(policy)
    }

    /// Get a reference to the policy.
    pub fn policy(&self) -> &RedactionPolicy {
        &self.policy
    }

    /// Get the current policy version.
    pub fn policy_version(&self) -> &str {
        &self.policy.schema_version
    }

    pub fn classifier(&self) -> &HostnameClassifier {
        &self.classifier
    }

    pub fn header_redactor(&self) -> &HeaderRedactor {
        &self.headers
    }

    pub fn query_redactor(&self) -> &QueryRedactor {
        &self.query
    }

    /// Classify a hostname.
    pub fn classify(&self, hostname: &str) -> HostClass {
        self.classifier.classify(hostname)
    }

    /// Whether requests to this hostname must be redacted.
    pub fn is_hostname_redacted(&self, hostname: &str) -> bool {
        self.classifier.is_redacted(hostname)
    }

    /// Mask sensitive header values when `should_redact` is set.
    pub fn redact_headers<K, V>(&self, headers: &[(K, V)], should_redact: bool) -> Redacted<HeaderSet>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.headers.redact(headers, should_redact)
    }

    /// Mask sensitive query values of a full URL when `should_redact` is set.
    pub fn redact_url(&self, url: &str, should_redact: bool) -> Redacted<String> {
        self.query.redact_url(url, should_redact)
    }
}

impl Default for RedactionEngine {
    fn default() -> Self {
        Self::new(RedactionPolicy::default()).expect("built-in redaction policy is valid")
    }
}
