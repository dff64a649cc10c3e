#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_yaml_ng::Value;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Split the input into target and patch halves; merging arbitrary
        // value shapes should never panic
        if let Some((target_src, patch_src)) = content.split_once('\x00') {
            let target: Result<Value, _> = serde_yaml_ng::from_str(target_src);
            let patch: Result<Value, _> = serde_yaml_ng::from_str(patch_src);
            if let (Ok(mut target), Ok(patch)) = (target, patch) {
                kovl::patch::merge(&mut target, &patch);
            }
        }
    }
});
