//! Fuzz target: slug generation and validation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use yotc_core::{slug::generate_slug_from_name, validate::validate_slug};

fuzz_target!(|data: &[u8]| {
    let Ok(name) = std::str::from_utf8(data) else {
        return;
    };
    let slug = generate_slug_from_name(name);
    let words = name.split(|c: char| c.is_whitespace() || c == '-').filter(|w| !w.is_empty()).count();
    // Lowercasing may expand a letter, never drop one.
    assert!(slug.chars().count() >= words, "one character per word at least");
    let _ = validate_slug(name);
    let _ = validate_slug(&slug);
});
