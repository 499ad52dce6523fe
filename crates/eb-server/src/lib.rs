//! echoback: an HTTP service that replies with a JSON description of the
//! request it received.
//!
//! Requests to hostnames carrying a redaction marker label (`r`, `redact`,
//! `redacted`) have sensitive header values and query values replaced
//! before they are echoed or logged. Reserved hostnames under the apex
//! domain serve a redirect instead of an echo.

pub mod echo;
pub mod error;
pub mod exit_codes;
pub mod handler;
pub mod logging;
pub mod routing;
pub mod server;

pub use echo::{assemble, Echo, EchoRecord, EchoRequest};
pub use error::{EchoError, ServeError};
pub use handler::{handle, AppState, EchoResponse};
pub use routing::{route, Route};
pub use server::EchoServer;

use eb_config::ServerConfig;
use eb_redact::RedactionEngine;

/// Build the redaction engine named by `config`, or the built-in one.
pub fn load_engine(config: &ServerConfig) -> Result<RedactionEngine, ServeError> {
    match config.redaction_policy {
        Some(ref path) => Ok(RedactionEngine::load(path)?),
        None => Ok(RedactionEngine::default()),
    }
}
