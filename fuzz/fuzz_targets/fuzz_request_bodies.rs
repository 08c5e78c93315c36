//! Fuzz target: JSON request bodies and their validators.
//!
//! Arbitrary bytes are parsed as each body type the gateway accepts; any
//! body that parses must validate without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use yotc_core::{
    validate::{validate_club_suggestion, validate_club_update, validate_event, validate_profile},
    ClubSuggestion, ClubUpdate, EventDraft, UserProfile,
};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = serde_json::from_slice::<ClubSuggestion>(data) {
        let _ = validate_club_suggestion(&s);
    }
    if let Ok(u) = serde_json::from_slice::<ClubUpdate>(data) {
        let _ = validate_club_update(&u);
    }
    if let Ok(d) = serde_json::from_slice::<EventDraft>(data) {
        let _ = validate_event(&d);
    }
    if let Ok(p) = serde_json::from_slice::<UserProfile>(data) {
        let _ = validate_profile(&p);
    }
});
