//! Echo assembly: turns a received request into the JSON record sent back.

use std::collections::BTreeMap;

use eb_redact::{HostClass, RedactionEngine};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::EchoError;

/// Methods whose body is echoed.
const BODY_METHODS: &[&str] = &["PUT", "POST"];

/// A request as received, independent of the HTTP library.
#[derive(Debug, Clone, Default)]
pub struct EchoRequest {
    /// Method as sent (`GET`, `POST`, ...).
    pub method: String,
    /// Request target: origin-form (`/path?q`) or absolute-form.
    pub target: String,
    /// Headers in arrival order, names as sent.
    pub headers: Vec<(String, String)>,
    /// Raw body bytes, `None` when the request carried no body.
    pub body: Option<Vec<u8>>,
}

impl EchoRequest {
    pub fn new(method: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// First value of a header, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the body of this method is echoed.
    pub fn echoes_body(&self) -> bool {
        BODY_METHODS
            .iter()
            .any(|m| m.eq_ignore_ascii_case(&self.method))
    }

    /// Rebuild the absolute request URL.
    ///
    /// Absolute-form targets are used as-is; origin-form targets are joined
    /// to `scheme` and the `Host` header.
    pub fn absolute_url(&self, scheme: &str) -> Result<Url, EchoError> {
        let raw = if self.target.starts_with("http://") || self.target.starts_with("https://") {
            self.target.clone()
        } else {
            let host = self
                .header("host")
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .ok_or(EchoError::MissingHost)?;
            format!("{}://{}{}", scheme, host, self.target)
        };

        let url = Url::parse(&raw).map_err(|e| EchoError::InvalidUrl(e.to_string()))?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(EchoError::MissingHost);
        }
        Ok(url)
    }
}

/// The JSON document returned for an echoed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoRecord {
    pub method: String,
    pub url: String,
    pub path: String,
    pub host: String,
    pub hostname: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

/// An assembled record plus what the redaction engine did to it.
#[derive(Debug, Clone)]
pub struct Echo {
    pub record: EchoRecord,
    pub host_class: HostClass,
    pub headers_redacted: usize,
    pub params_redacted: usize,
}

impl Echo {
    pub fn redacted(&self) -> bool {
        self.host_class.should_redact()
    }
}

/// Build the echo record for `request`, already parsed into `url`.
///
/// The hostname is classified once; header values and URL query values
/// are redacted when it says so. Path, host and body are never redacted.
pub fn assemble(request: &EchoRequest, url: &Url, engine: &RedactionEngine) -> Echo {
    let hostname = url.host_str().unwrap_or_default().to_string();
    let host = match url.port() {
        Some(port) => format!("{}:{}", hostname, port),
        None => hostname.clone(),
    };

    let host_class = engine.classify(&hostname);
    let should_redact = host_class.should_redact();

    let redacted_url = engine.redact_url(url.as_str(), should_redact);
    let redacted_headers = engine.redact_headers(&request.headers, should_redact);

    let headers_redacted = redacted_headers.redacted;
    let headers = redacted_headers
        .into_inner()
        .into_iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value))
        .collect();

    let body = if request.echoes_body() {
        request
            .body
            .as_deref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    } else {
        None
    };

    Echo {
        record: EchoRecord {
            method: request.method.clone(),
            url: redacted_url.output,
            path: url.path().to_string(),
            host,
            hostname,
            headers,
            body,
        },
        host_class,
        headers_redacted,
        params_redacted: redacted_url.redacted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_of(request: &EchoRequest) -> Echo {
        let engine = RedactionEngine::default();
        let url = request.absolute_url("https").unwrap();
        assemble(request, &url, &engine)
    }

    #[test]
    fn test_get_on_plain_host() {
        let request = EchoRequest::new("GET", "/stuff?foo=bar")
            .with_header("Host", "example.com")
            .with_header("X-Test", "true");
        let echo = echo_of(&request);

        assert_eq!(echo.host_class, HostClass::Unmarked);
        assert_eq!(echo.record.method, "GET");
        assert_eq!(echo.record.url, "https://example.com/stuff?foo=bar");
        assert_eq!(echo.record.path, "/stuff");
        assert_eq!(echo.record.host, "example.com");
        assert_eq!(echo.record.hostname, "example.com");
        assert_eq!(echo.record.headers.get("x-test").map(String::as_str), Some("true"));
        assert_eq!(echo.record.body, None);
    }

    #[test]
    fn test_redacted_host_scrubs_url_and_headers() {
        let request = EchoRequest::new("GET", "/stuff?key=s&page=2")
            .with_header("Host", "foo.r.echoback.dev")
            .with_header("Authorization", "Bearer abc")
            .with_header("Accept", "*/*");
        let echo = echo_of(&request);

        assert!(echo.redacted());
        assert_eq!(
            echo.record.url,
            "https://foo.r.echoback.dev/stuff?key=REDACTED&page=2"
        );
        assert_eq!(echo.record.headers["authorization"], "[REDACTED]");
        assert_eq!(echo.record.headers["accept"], "*/*");
        assert_eq!(echo.record.headers["host"], "foo.r.echoback.dev");
        assert_eq!(echo.headers_redacted, 1);
        assert_eq!(echo.params_redacted, 1);
    }

    #[test]
    fn test_non_default_port_kept_in_host() {
        let request = EchoRequest::new("GET", "/").with_header("Host", "example.com:8443");
        let echo = echo_of(&request);
        assert_eq!(echo.record.host, "example.com:8443");
        assert_eq!(echo.record.hostname, "example.com");

        let request = EchoRequest::new("GET", "/").with_header("Host", "example.com:443");
        let echo = echo_of(&request);
        assert_eq!(echo.record.host, "example.com");
    }

    #[test]
    fn test_headers_lowercased_last_value_wins() {
        let request = EchoRequest::new("GET", "/")
            .with_header("Host", "example.com")
            .with_header("X-Dup", "one")
            .with_header("x-dup", "two");
        let echo = echo_of(&request);
        assert_eq!(echo.record.headers["x-dup"], "two");
        let keys: Vec<_> = echo.record.headers.keys().cloned().collect();
        assert_eq!(keys, vec!["host", "x-dup"]);
    }

    #[test]
    fn test_body_only_for_put_and_post() {
        for method in ["POST", "PUT"] {
            let request = EchoRequest::new(method, "/")
                .with_header("Host", "example.com")
                .with_body("hello");
            assert_eq!(echo_of(&request).record.body.as_deref(), Some("hello"));
        }

        for method in ["PATCH", "DELETE", "GET"] {
            let request = EchoRequest::new(method, "/")
                .with_header("Host", "example.com")
                .with_body("hello");
            assert_eq!(echo_of(&request).record.body, None, "{}", method);
        }

        let request = EchoRequest::new("POST", "/").with_header("Host", "example.com");
        assert_eq!(echo_of(&request).record.body, None);
    }

    #[test]
    fn test_body_is_never_redacted() {
        let request = EchoRequest::new("POST", "/?token=t")
            .with_header("Host", "r.echoback.dev")
            .with_body("token=abc");
        let echo = echo_of(&request);
        assert_eq!(echo.record.body.as_deref(), Some("token=abc"));
        assert_eq!(echo.record.url, "https://r.echoback.dev/?token=REDACTED");
    }

    #[test]
    fn test_invalid_utf8_body_is_lossy() {
        let request = EchoRequest::new("POST", "/")
            .with_header("Host", "example.com")
            .with_body(vec![0x66, 0x6f, 0xff]);
        assert_eq!(echo_of(&request).record.body.as_deref(), Some("fo\u{fffd}"));
    }

    #[test]
    fn test_absolute_url_errors() {
        let request = EchoRequest::new("GET", "/");
        assert_eq!(request.absolute_url("http"), Err(EchoError::MissingHost));

        let request = EchoRequest::new("GET", "/").with_header("Host", "bad host");
        assert!(matches!(
            request.absolute_url("http"),
            Err(EchoError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_absolute_form_target() {
        let request = EchoRequest::new("GET", "http://example.com/a?b=c")
            .with_header("Host", "ignored.example");
        let url = request.absolute_url("https").unwrap();
        assert_eq!(url.as_str(), "http://example.com/a?b=c");
    }

    #[test]
    fn test_record_serializes_null_body() {
        let request = EchoRequest::new("GET", "/").with_header("Host", "example.com");
        let json = serde_json::to_value(&echo_of(&request).record).unwrap();
        assert!(json["body"].is_null());
        assert_eq!(json["headers"]["host"], "example.com");
    }
}
