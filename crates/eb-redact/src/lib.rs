//! Request redaction engine for echoback.
//!
//! Decides from a request's hostname whether the echoed response must be
//! scrubbed, and scrubs header values and URL query values when it must.
//!
//! # Key Features
//!
//! - **Hostname markers**: whole-label matching of `redacted` / `notredacted`
//!   style markers anywhere in the hostname.
//! - **Rule tables**: sensitive header and query names are plain data
//!   (exact, suffix, substring, prefix and regex rules) loaded from a policy.
//! - **Byte-for-byte passthrough**: anything not matched is returned exactly
//!   as received; matched values are replaced whole by a fixed sentinel.
//! - **Stateless**: the compiled engine is immutable and `Send + Sync`.
//!
//! # Example
//!
//! ```
//! use eb_redact::RedactionEngine;
//!
//! let engine = RedactionEngine::default();
//! let should_redact = engine.is_hostname_redacted("r.echoback.dev");
//!
//! let url = engine.redact_url("https://r.echoback.dev/?key=s3cret&page=2", should_redact);
//! assert_eq!(url.output, "https://r.echoback.dev/?key=REDACTED&page=2");
//!
//! let headers = engine.redact_headers(&[("Cookie", "id=1")], should_redact);
//! assert_eq!(headers.output[0].1, "[REDACTED]");
//! ```

pub mod classify;
pub mod engine;
pub mod error;
pub mod headers;
pub mod policy;
pub mod query;
pub mod rules;
pub mod surface;

pub use classify::{HostClass, HostnameClassifier};
pub use engine::{Redacted, RedactionEngine};
pub use error::{RedactionError, Result};
pub use headers::{HeaderRedactor, HeaderSet};
pub use policy::{CustomRule, HeaderRules, HostnameRules, QueryParamRules, RedactionPolicy};
pub use query::QueryRedactor;
pub use rules::{NameRule, RuleTable};
pub use surface::{Surface, HEADER_SENTINEL, QUERY_SENTINEL};
