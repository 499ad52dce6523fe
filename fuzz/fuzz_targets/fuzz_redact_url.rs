//! Fuzz target for URL query redaction.
//!
//! Arbitrary text must never panic, must pass through untouched when not
//! redacting, and redacting twice must equal redacting once.

#![no_main]

use eb_redact::RedactionEngine;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(url) = std::str::from_utf8(data) {
        let engine = RedactionEngine::default();
        assert_eq!(engine.redact_url(url, false).output, url);

        let once = engine.redact_url(url, true).output;
        let twice = engine.redact_url(&once, true).output;
        assert_eq!(once, twice);
    }
});
