//! Fuzz target: coercion of stored timestamp values.

#![no_main]

use libfuzzer_sys::fuzz_target;
use yotc_core::timestamp::to_timestamp;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let _ = to_timestamp(&value);
});
