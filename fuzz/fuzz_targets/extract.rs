#![no_main]

use libfuzzer_sys::fuzz_target;
use smokegen::backend::synthesize;
use smokegen::frontend::extract;

fuzz_target!(|data: &[u8]| {
    // Uploads are rejected before the core when they are not UTF-8
    if let Ok(s) = std::str::from_utf8(data) {
        let blocks = extract(s);
        let artifacts = synthesize(&blocks);
        assert_eq!(blocks.len(), artifacts.len());
    }
});
