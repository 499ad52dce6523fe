//! Compiled name-matching rule tables.
//!
//! Each surface gets one [`RuleTable`]: an ordered list of exact, suffix,
//! substring, prefix and regex rules, evaluated first match wins.

use crate::policy::{CustomRule, HeaderRules, QueryParamRules};
use crate::{RedactionError, Result, Surface};
use regex::{Regex, RegexBuilder};

/// A single name-matching rule.
#[derive(Debug, Clone)]
pub enum NameRule {
    /// Whole name equals the needle, ignoring case.
    Exact(String),
    /// Name ends with the needle, ignoring case.
    Suffix(String),
    /// Name contains the needle, ignoring case.
    Contains(String),
    /// Name starts with the needle, case-sensitive.
    Prefix(String),
    /// Named regex from a custom rule.
    Pattern { name: String, regex: Regex },
}

impl NameRule {
    /// Case-insensitive exact rule.
    pub fn exact(needle: &str) -> Self {
        NameRule::Exact(needle.to_lowercase())
    }

    /// Case-insensitive suffix rule.
    pub fn suffix(needle: &str) -> Self {
        NameRule::Suffix(needle.to_lowercase())
    }

    /// Case-insensitive substring rule.
    pub fn contains(needle: &str) -> Self {
        NameRule::Contains(needle.to_lowercase())
    }

    /// Case-sensitive prefix rule.
    pub fn prefix(needle: &str) -> Self {
        NameRule::Prefix(needle.to_string())
    }

    /// Compile a custom regex rule (case-insensitive).
    pub fn pattern(rule: &CustomRule) -> Result<Self> {
        let regex = RegexBuilder::new(&rule.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| RedactionError::PatternError {
                rule: rule.name.clone(),
                message: e.to_string(),
            })?;
        Ok(NameRule::Pattern {
            name: rule.name.clone(),
            regex,
        })
    }

    /// Test the rule. `lowered` must be `name.to_lowercase()`.
    fn matches_with(&self, name: &str, lowered: &str) -> bool {
        match self {
            NameRule::Exact(needle) => lowered == needle,
            NameRule::Suffix(needle) => lowered.ends_with(needle.as_str()),
            NameRule::Contains(needle) => lowered.contains(needle.as_str()),
            NameRule::Prefix(needle) => name.starts_with(needle.as_str()),
            NameRule::Pattern { regex, .. } => regex.is_match(name),
        }
    }

    /// Test the rule against a name.
    pub fn matches(&self, name: &str) -> bool {
        self.matches_with(name, &name.to_lowercase())
    }
}

impl std::fmt::Display for NameRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameRule::Exact(n) => write!(f, "exact:{}", n),
            NameRule::Suffix(n) => write!(f, "suffix:{}", n),
            NameRule::Contains(n) => write!(f, "contains:{}", n),
            NameRule::Prefix(n) => write!(f, "prefix:{}", n),
            NameRule::Pattern { name, .. } => write!(f, "pattern:{}", name),
        }
    }
}

/// Ordered rule table for one surface.
#[derive(Debug, Clone)]
pub struct RuleTable {
    surface: Surface,
    rules: Vec<NameRule>,
}

impl RuleTable {
    /// Create an empty table.
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            rules: Vec::new(),
        }
    }

    /// Append a rule.
    pub fn push(&mut self, rule: NameRule) {
        self.rules.push(rule);
    }

    /// Build the header table: exact names, then suffixes, then substrings,
    /// then custom header rules.
    pub fn for_headers<'a>(
        rules: &HeaderRules,
        custom: impl IntoIterator<Item = &'a CustomRule>,
    ) -> Result<Self> {
        let mut table = Self::new(Surface::Header);
        table
            .rules
            .extend(rules.exact.iter().map(|n| NameRule::exact(n)));
        table
            .rules
            .extend(rules.suffixes.iter().map(|n| NameRule::suffix(n)));
        table
            .rules
            .extend(rules.substrings.iter().map(|n| NameRule::contains(n)));
        table.extend_custom(custom)?;
        Ok(table)
    }

    /// Build the query parameter table: exact keys, then prefixes, then
    /// custom query rules.
    pub fn for_query_params<'a>(
        rules: &QueryParamRules,
        custom: impl IntoIterator<Item = &'a CustomRule>,
    ) -> Result<Self> {
        let mut table = Self::new(Surface::QueryParam);
        table
            .rules
            .extend(rules.exact.iter().map(|n| NameRule::exact(n)));
        table
            .rules
            .extend(rules.prefixes.iter().map(|n| NameRule::prefix(n)));
        table.extend_custom(custom)?;
        Ok(table)
    }

    fn extend_custom<'a>(&mut self, custom: impl IntoIterator<Item = &'a CustomRule>) -> Result<()> {
        for rule in custom {
            if rule.surface != self.surface {
                continue;
            }
            self.rules.push(NameRule::pattern(rule)?);
        }
        Ok(())
    }

    /// Surface this table applies to.
    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// All rules in evaluation order.
    pub fn rules(&self) -> &[NameRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule matching `name`, if any.
    pub fn first_match(&self, name: &str) -> Option<&NameRule> {
        let lowered = name.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches_with(name, &lowered))
    }

    /// Whether any rule matches `name`.
    pub fn matches(&self, name: &str) -> bool {
        self.first_match(name).is_some()
    }
}
