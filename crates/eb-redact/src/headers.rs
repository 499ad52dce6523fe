//! Header redaction.

use crate::engine::Redacted;
use crate::rules::RuleTable;
use crate::surface::HEADER_SENTINEL;

/// Ordered header name/value pairs, as received.
pub type HeaderSet = Vec<(String, String)>;

/// Masks the values of sensitive headers.
#[derive(Debug, Clone)]
pub struct HeaderRedactor {
    rules: RuleTable,
}

impl HeaderRedactor {
    pub fn new(rules: RuleTable) -> Self {
        Self { rules }
    }

    /// The compiled rule table.
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Whether a header name is sensitive (case-insensitive).
    pub fn is_sensitive(&self, name: &str) -> bool {
        self.rules.matches(name)
    }

    /// Return a copy of `headers` with sensitive values replaced by
    /// `[REDACTED]`. Names and order are kept; when `should_redact` is false
    /// the copy is identical to the input.
    pub fn redact<K, V>(&self, headers: &[(K, V)], should_redact: bool) -> Redacted<HeaderSet>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut count = 0;
        let output = headers
            .iter()
            .map(|(name, value)| {
                let name = name.as_ref();
                if should_redact && self.is_sensitive(name) {
                    count += 1;
                    (name.to_string(), HEADER_SENTINEL.to_string())
                } else {
                    (name.to_string(), value.as_ref().to_string())
                }
            })
            .collect();

        Redacted::new(output, count)
    }
}
