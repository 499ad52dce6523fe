//! Request handling, independent of the HTTP transport.

use eb_config::{RoutingConfig, ServerConfig};
use eb_redact::RedactionEngine;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::echo::{assemble, EchoRequest};
use crate::error::EchoError;
use crate::logging::{event_names, REQUEST_TARGET};
use crate::routing::{route, Route};

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Shared, immutable state every worker reads.
#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: RedactionEngine,
    pub routing: RoutingConfig,
    pub scheme: String,
    pub max_body_bytes: u64,
}

impl AppState {
    pub fn new(config: &ServerConfig, engine: RedactionEngine) -> Self {
        Self {
            engine,
            routing: config.routing.clone(),
            scheme: config.scheme.clone(),
            max_body_bytes: config.max_body_bytes,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&ServerConfig::default(), RedactionEngine::default())
    }
}

/// A response ready to be written by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    error: ErrorMessage<'a>,
}

#[derive(Serialize)]
struct ErrorMessage<'a> {
    message: &'a str,
}

impl EchoResponse {
    fn json(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string())],
            body,
        }
    }

    /// `{"success": false, "error": {"message": ...}}` with the error's status.
    pub fn error(err: &EchoError) -> Self {
        let message = err.to_string();
        let envelope = ErrorEnvelope {
            success: false,
            error: ErrorMessage { message: &message },
        };
        // Serializing a struct of strings cannot fail.
        let body = serde_json::to_vec(&envelope).unwrap_or_default();
        Self::json(err.status(), body)
    }

    pub fn redirect(location: &str) -> Self {
        Self {
            status: 302,
            headers: vec![("Location".to_string(), location.to_string())],
            body: Vec::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn without_body(mut self) -> Self {
        self.body.clear();
        self
    }
}

/// Handle one request.
pub fn handle(request: &EchoRequest, state: &AppState, request_id: &str) -> EchoResponse {
    let response = respond(request, state, request_id);
    if request.method.eq_ignore_ascii_case("HEAD") {
        response.without_body()
    } else {
        response
    }
}

fn respond(request: &EchoRequest, state: &AppState, request_id: &str) -> EchoResponse {
    let url = match request.absolute_url(&state.scheme) {
        Ok(url) => url,
        Err(err) => {
            warn!(
                target: REQUEST_TARGET,
                event = event_names::REQUEST_REJECTED,
                request_id,
                method = %request.method,
                error = %err,
                "unparseable request"
            );
            return EchoResponse::error(&err);
        }
    };

    match route(&request.method, &url, &state.routing) {
        Route::Redirect { location } => {
            debug!(
                target: REQUEST_TARGET,
                event = event_names::REQUEST_REDIRECTED,
                request_id,
                host = url.host_str().unwrap_or_default(),
                location = %location,
                "reserved hostname redirected"
            );
            EchoResponse::redirect(&location)
        }
        Route::Reject => {
            debug!(
                target: REQUEST_TARGET,
                event = event_names::REQUEST_REJECTED,
                request_id,
                method = %request.method,
                host = url.host_str().unwrap_or_default(),
                "reserved hostname rejected"
            );
            EchoResponse::error(&EchoError::ReservedHostname)
        }
        Route::Echo => {
            let echo = assemble(request, &url, &state.engine);
            info!(
                target: REQUEST_TARGET,
                event = event_names::REQUEST_ECHOED,
                request_id,
                method = %echo.record.method,
                host = %echo.record.host,
                path = %echo.record.path,
                host_class = %echo.host_class,
                redacted = echo.redacted(),
                headers_redacted = echo.headers_redacted,
                params_redacted = echo.params_redacted,
                url = %echo.record.url,
                "echoback request"
            );
            match serde_json::to_vec(&echo.record) {
                Ok(body) => EchoResponse::json(200, body),
                Err(e) => {
                    warn!(target: REQUEST_TARGET, request_id, error = %e, "failed to serialize echo");
                    EchoResponse::error(&EchoError::Internal)
                }
            }
        }
    }
}
