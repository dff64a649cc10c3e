#![no_main]

use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Fuzz document stream parsing - this should never panic
        let _ = kovl::loader::parse_documents(content, Path::new("fuzz/doc.yaml"));
    }
});
