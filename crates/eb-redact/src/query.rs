//! URL query string redaction.
//!
//! Works on the raw URL text instead of a parsed-and-reserialised URL, so
//! everything outside the replaced values (scheme, authority, path, fragment,
//! unmatched pairs, key encodings) comes back byte-for-byte.

use crate::engine::Redacted;
use crate::rules::RuleTable;
use crate::surface::QUERY_SENTINEL;
use std::borrow::Cow;
use url::form_urlencoded;

/// Masks the values of sensitive query parameters.
#[derive(Debug, Clone)]
pub struct QueryRedactor {
    rules: RuleTable,
}

impl QueryRedactor {
    pub fn new(rules: RuleTable) -> Self {
        Self { rules }
    }

    /// The compiled rule table.
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Whether a decoded query key is sensitive.
    pub fn is_sensitive(&self, key: &str) -> bool {
        self.rules.matches(key)
    }

    /// Redact the query string of a full URL.
    pub fn redact_url(&self, url: &str, should_redact: bool) -> Redacted<String> {
        if !should_redact {
            return Redacted::untouched(url.to_string());
        }

        let Some((start, end)) = query_bounds(url) else {
            return Redacted::untouched(url.to_string());
        };

        let query = self.redact_query(&url[start..end]);
        let mut output = String::with_capacity(url.len() + query.redacted * QUERY_SENTINEL.len());
        output.push_str(&url[..start]);
        output.push_str(&query.output);
        output.push_str(&url[end..]);

        Redacted::new(output, query.redacted)
    }

    /// Redact a bare query string (without the leading `?`).
    ///
    /// Pairs are split on `&`; empty segments and duplicate keys are kept.
    /// A bare key with no `=` gains one when its value is masked.
    pub fn redact_query(&self, query: &str) -> Redacted<String> {
        let mut output = String::with_capacity(query.len());
        let mut count = 0;

        for (i, segment) in query.split('&').enumerate() {
            if i > 0 {
                output.push('&');
            }

            let raw_key = segment
                .split_once('=')
                .map_or(segment, |(key, _)| key);

            if !segment.is_empty() && self.is_sensitive(&decode_key(raw_key)) {
                output.push_str(raw_key);
                output.push('=');
                output.push_str(QUERY_SENTINEL);
                count += 1;
            } else {
                output.push_str(segment);
            }
        }

        Redacted::new(output, count)
    }
}

/// Byte range of the query text (excluding `?`), if the URL has one.
///
/// A `?` inside the fragment does not start a query.
fn query_bounds(url: &str) -> Option<(usize, usize)> {
    let fragment = url.find('#').unwrap_or(url.len());
    let question = url[..fragment].find('?')?;
    Some((question + 1, fragment))
}

/// Decode a raw key the way `application/x-www-form-urlencoded` does:
/// `+` is a space, then percent-decoding (lossy UTF-8).
fn decode_key(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['%', '+']) {
        return Cow::Borrowed(raw);
    }
    form_urlencoded::parse(raw.as_bytes())
        .next()
        .map(|(key, _)| Cow::Owned(key.into_owned()))
        .unwrap_or(Cow::Borrowed(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::QueryParamRules;

    fn redactor() -> QueryRedactor {
        QueryRedactor::new(RuleTable::for_query_params(&QueryParamRules::default(), &[]).unwrap())
    }

    #[test]
    fn test_scenario_key_and_somekey() {
        let r = redactor();
        let result = r.redact_url("https://r.echoback.dev/stuff?key=svalue&somekey=value", true);
        assert_eq!(
            result.output,
            "https://r.echoback.dev/stuff?key=REDACTED&somekey=value"
        );
        assert_eq!(result.redacted, 1);
    }

    #[test]
    fn test_not_redacting_is_identity() {
        let r = redactor();
        let url = "https://example.com/stuff?key=svalue&token=x#frag";
        let result = r.redact_url(url, false);
        assert_eq!(result.output, url);
        assert!(!result.was_modified());
    }

    #[test]
    fn test_preserves_order_and_duplicates() {
        let r = redactor();
        let result = r.redact_query("a=1&token=t1&b=2&token=t2&a=3");
        assert_eq!(result.output, "a=1&token=REDACTED&b=2&token=REDACTED&a=3");
        assert_eq!(result.redacted, 2);
    }

    #[test]
    fn test_case_rules() {
        let r = redactor();
        assert_eq!(r.redact_query("KEY=x&Api_Key=y").output, "KEY=REDACTED&Api_Key=REDACTED");
        // Provider prefixes are case-sensitive.
        assert_eq!(r.redact_query("SK_live=x&sk_live=y").output, "SK_live=x&sk_live=REDACTED");
    }

    #[test]
    fn test_encoded_keys_are_decoded_for_matching() {
        let r = redactor();
        assert_eq!(r.redact_query("%6Bey=x").output, "%6Bey=REDACTED");
        assert_eq!(r.redact_query("api%5Fkey=x").output, "api%5Fkey=REDACTED");
        assert_eq!(r.redact_query("ghp%5Fabc=x").output, "ghp%5Fabc=REDACTED");
        // "api+key" decodes to "api key", which is not sensitive.
        assert_eq!(r.redact_query("api+key=x").output, "api+key=x");
    }

    #[test]
    fn test_values_with_equals_and_empty_segments() {
        let r = redactor();
        assert_eq!(
            r.redact_query("token=a=b==&&x=").output,
            "token=REDACTED&&x="
        );
        assert_eq!(r.redact_query("").output, "");
    }

    #[test]
    fn test_bare_key_gains_value() {
        let r = redactor();
        assert_eq!(r.redact_query("key&x").output, "key=REDACTED&x");
    }

    #[test]
    fn test_fragment_and_path_untouched() {
        let r = redactor();
        let url = "http://r.example.com:8080/a%20b/key=1?x=1&key=2#key=3?token=4";
        assert_eq!(
            r.redact_url(url, true).output,
            "http://r.example.com:8080/a%20b/key=1?x=1&key=REDACTED#key=3?token=4"
        );
    }

    #[test]
    fn test_question_mark_only_in_fragment() {
        let r = redactor();
        let url = "https://r.example.com/path#frag?key=1";
        assert_eq!(r.redact_url(url, true).output, url);
    }

    #[test]
    fn test_no_query() {
        let r = redactor();
        assert_eq!(r.redact_url("https://r.example.com/", true).output, "https://r.example.com/");
        assert_eq!(r.redact_url("https://r.example.com/?", true).output, "https://r.example.com/?");
    }

    #[test]
    fn test_idempotent() {
        let r = redactor();
        let once = r.redact_url("https://r.x/?key=a&sk_1=b&c=d", true).output;
        let twice = r.redact_url(&once, true).output;
        assert_eq!(once, twice);
    }
}
