//! Fuzz target for redaction policy JSON parsing and compilation.

#![no_main]

use eb_redact::{RedactionEngine, RedactionPolicy};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(policy) = serde_json::from_slice::<RedactionPolicy>(data) {
        // Validation and regex compilation report errors, never panic
        let _ = RedactionEngine::new(policy);
    }
});
