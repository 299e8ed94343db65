//! Fuzz target for whole-file label validation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wastekit::validation::validate_label_str;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };

    let issues = validate_label_str(content, 5);
    assert!(issues.len() <= content.lines().count() * 6);
});
