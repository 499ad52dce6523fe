//! Reserved hostname routing.
//!
//! `<label>.<apex>` for each reserved label serves no echo: `GET /` is
//! redirected to the canonical root and everything else is refused.

use eb_config::RoutingConfig;
use url::Url;

/// What to do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Reserved hostname, `GET /`: redirect.
    Redirect { location: String },
    /// Reserved hostname, anything else: 400.
    Reject,
    /// Echo the request back.
    Echo,
}

/// Pick the route for a request.
pub fn route(method: &str, url: &Url, routing: &RoutingConfig) -> Route {
    let Some(hostname) = url.host_str() else {
        return Route::Echo;
    };

    if !routing.is_reserved(hostname) {
        return Route::Echo;
    }

    if method.eq_ignore_ascii_case("GET") && url.path() == "/" {
        Route::Redirect {
            location: routing.canonical_root.clone(),
        }
    } else {
        Route::Reject
    }
}
