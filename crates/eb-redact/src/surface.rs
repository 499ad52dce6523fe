//! Request surfaces that carry redactable values.

use serde::{Deserialize, Serialize};

/// Sentinel substituted for sensitive header values.
pub const HEADER_SENTINEL: &str = "[REDACTED]";

/// Sentinel substituted for sensitive query parameter values.
///
/// Unlike the header sentinel this one has no brackets, so it never needs
/// percent-encoding inside a URL.
pub const QUERY_SENTINEL: &str = "REDACTED";

/// Part of a request a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// HTTP header, matched by name.
    Header,
    /// URL query parameter, matched by decoded key.
    QueryParam,
}

impl Surface {
    /// The fixed replacement value for this surface.
    pub fn sentinel(&self) -> &'static str {
        match self {
            Surface::Header => HEADER_SENTINEL,
            Surface::QueryParam => QUERY_SENTINEL,
        }
    }
}

impl std::fmt::Display for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Surface::Header => "header",
            Surface::QueryParam => "query_param",
        };
        write!(f, "{}", s)
    }
}
