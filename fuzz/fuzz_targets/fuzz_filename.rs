//! Fuzz target: upload filename sanitising.
//!
//! A sanitised name must never let a blob path escape its directory.

#![no_main]

use libfuzzer_sys::fuzz_target;
use yotc_store::blob::sanitize_filename;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(name) = sanitize_filename(raw) {
        assert!(!name.is_empty());
        assert!(!name.contains('/') && !name.contains('\\'), "separator survived: {name:?}");
        assert!(name != "." && name != "..", "relative component survived");
        let _ = yotc_core::validate::validate_logo(&name, data.len());
    }
});
