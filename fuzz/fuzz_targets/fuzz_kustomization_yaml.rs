#![no_main]

use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Fuzz kustomization parsing - this should never panic
        let _ = kovl::parse_kustomization(content, Path::new("fuzz/kustomization.yaml"));
    }
});
