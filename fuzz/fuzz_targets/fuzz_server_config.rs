//! Fuzz target for echoback.toml parsing and validation.

#![no_main]

use eb_config::{validate_config, ServerConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        // Should never panic, only return an error
        if let Ok(config) = ServerConfig::parse_toml(text) {
            let _ = validate_config(&config);
        }
    }
});
