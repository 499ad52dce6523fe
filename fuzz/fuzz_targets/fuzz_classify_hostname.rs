//! Fuzz target for hostname classification.
//!
//! Classification must be total and agree with `is_hostname_redacted`
//! regardless of case.

#![no_main]

use eb_redact::RedactionEngine;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(hostname) = std::str::from_utf8(data) {
        let engine = RedactionEngine::default();
        let class = engine.classify(hostname);
        assert_eq!(class.should_redact(), engine.is_hostname_redacted(hostname));
        assert_eq!(
            engine.is_hostname_redacted(hostname),
            engine.is_hostname_redacted(&hostname.to_ascii_uppercase())
        );
    }
});
