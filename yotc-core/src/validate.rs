//! Input validation for club, event and profile submissions.
//!
//! Every violation found is reported, at most one per field.

use std::sync::LazyLock;

use regex::Regex;

use crate::club::{ClubSuggestion, ClubUpdate};
use crate::error::{CoreError, FieldViolation};
use crate::event::EventDraft;
use crate::slug::is_slug_charset;
use crate::user::UserProfile;

#[expect(clippy::unwrap_used, reason = "pattern is a compile-time constant")]
static CLUB_CALLSIGN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^[A-Z0-9]+$").unwrap());

#[expect(clippy::unwrap_used, reason = "pattern is a compile-time constant")]
static PROFILE_CALLSIGN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^[A-Z0-9]{3,7}$").unwrap());

#[expect(clippy::unwrap_used, reason = "pattern is a compile-time constant")]
static WEBSITE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?://[^\s/$.?#].[^\s]*$").unwrap());

#[derive(Default)]
struct Violations(Vec<FieldViolation>);

impl Violations {
    fn push(&mut self, field: &'static str, reason: impl Into<String>) {
        if self.0.iter().all(|v| v.field != field) {
            self.0.push(FieldViolation { field, reason: reason.into() });
        }
    }

    fn text(&mut self, field: &'static str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if value.trim().is_empty() {
            self.push(field, "is required");
        } else if len < min {
            self.push(field, format!("minimum length is {min} characters"));
        } else if len > max {
            self.push(field, format!("maximum length is {max} characters"));
        }
    }

    fn max_len(&mut self, field: &'static str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(field, format!("maximum length is {max} characters"));
        }
    }

    fn club_callsign(&mut self, value: &str) {
        if value.trim().is_empty() {
            self.push("callsign", "is required");
        } else if !CLUB_CALLSIGN.is_match(value) {
            self.push("callsign", "must contain only letters and digits");
        }
        self.max_len("callsign", value, 10);
    }

    fn website(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }
        if !WEBSITE.is_match(value) {
            self.push("website", "must be an http(s) URL");
        }
        self.max_len("website", value, 200);
    }

    fn finish(self) -> Result<(), CoreError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(self.0))
        }
    }
}

/// Validates a new club suggestion.
///
/// # Errors
/// [`CoreError::Validation`] listing every offending field.
pub fn validate_club_suggestion(suggestion: &ClubSuggestion) -> Result<(), CoreError> {
    let mut v = Violations::default();
    v.text("name", &suggestion.name, 3, 100);
    v.club_callsign(&suggestion.callsign);
    v.text("description", &suggestion.description, 10, 500);
    v.text("location", &suggestion.location, 3, 100);
    if let Some(website) = &suggestion.website {
        v.website(website.trim());
    }
    v.finish()
}

/// Validates the fields present in a club edit.
///
/// # Errors
/// [`CoreError::Validation`] listing every offending field.
pub fn validate_club_update(update: &ClubUpdate) -> Result<(), CoreError> {
    let mut v = Violations::default();
    if let Some(name) = &update.name {
        v.text("name", name, 3, 100);
    }
    if let Some(callsign) = &update.callsign {
        v.club_callsign(callsign);
    }
    if let Some(description) = &update.description {
        v.text("description", description, 10, 500);
    }
    if let Some(location) = &update.location {
        v.text("location", location, 3, 100);
    }
    if let Some(website) = &update.website {
        v.website(website.trim());
    }
    if let Some(slug) = &update.slug {
        slug_rules(&mut v, slug);
    }
    v.finish()
}

/// Validates a slug an admin assigns to a club.
///
/// # Errors
/// [`CoreError::Validation`] if the slug is blank, too long, or uses
/// characters other than `a-z`, `0-9` and `-`.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    let mut v = Violations::default();
    slug_rules(&mut v, slug);
    v.finish()
}

fn slug_rules(v: &mut Violations, slug: &str) {
    if slug.is_empty() {
        v.push("slug", "is required");
    } else if !is_slug_charset(slug) {
        v.push("slug", "may only contain lowercase letters, digits and hyphens");
    }
    v.max_len("slug", slug, 100);
}

/// Validates an event before it is created or after an edit is merged.
///
/// # Errors
/// [`CoreError::Validation`] listing every offending field.
pub fn validate_event(draft: &EventDraft) -> Result<(), CoreError> {
    let mut v = Violations::default();
    v.text("name", &draft.name, 3, 100);
    v.text("description", &draft.description, 10, 1000);
    if draft.end_time < draft.start_time {
        v.push("endTime", "must not be before the start time");
    }
    v.finish()
}

/// Validates a self-service profile.
///
/// # Errors
/// [`CoreError::Validation`] listing every offending field.
pub fn validate_profile(profile: &UserProfile) -> Result<(), CoreError> {
    let mut v = Violations::default();
    let name = profile.name.trim();
    if name.is_empty() {
        v.push("name", "is required");
    } else if name.chars().count() < 2 {
        v.push("name", "minimum length is 2 characters");
    }
    if profile.callsign.trim().is_empty() {
        v.push("callsign", "is required");
    } else if !PROFILE_CALLSIGN.is_match(profile.callsign.trim()) {
        v.push("callsign", "must be 3 to 7 letters and digits");
    }
    v.finish()
}

/// Largest accepted club logo.
pub const MAX_LOGO_BYTES: usize = 5 * 1024 * 1024;

const LOGO_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

/// Validates a club logo upload by file extension and size.
///
/// # Errors
/// [`CoreError::Validation`] for non-image extensions, empty files, or
/// files larger than [`MAX_LOGO_BYTES`].
pub fn validate_logo(filename: &str, size: usize) -> Result<(), CoreError> {
    let mut v = Violations::default();
    let is_image = filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| LOGO_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)));
    if !is_image {
        v.push("filename", "must be a JPEG, PNG, WEBP or GIF image");
    }
    if size == 0 {
        v.push("file", "is empty");
    } else if size > MAX_LOGO_BYTES {
        v.push("file", "must be less than 5MB");
    }
    v.finish()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn suggestion() -> ClubSuggestion {
        ClubSuggestion {
            name: "Denver Radio Club".to_owned(),
            callsign: "w0tx".to_owned(),
            description: "Serving the Denver metro since 1917.".to_owned(),
            location: "Denver, CO".to_owned(),
            website: Some("https://w0tx.org".to_owned()),
        }
    }

    fn fields(err: Result<(), CoreError>) -> Vec<&'static str> {
        match err {
            Err(CoreError::Validation(v)) => v.into_iter().map(|f| f.field).collect(),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn valid_suggestion_passes() {
        assert!(validate_club_suggestion(&suggestion()).is_ok());
    }

    #[test]
    fn every_bad_field_is_reported_once() {
        let bad = ClubSuggestion {
            name: "DR".to_owned(),
            callsign: "W0-TX-TOO-LONG".to_owned(),
            description: "short".to_owned(),
            location: String::new(),
            website: Some("ftp://example.org".to_owned()),
        };
        assert_eq!(
            fields(validate_club_suggestion(&bad)),
            vec!["name", "callsign", "description", "location", "website"]
        );
    }

    #[test]
    fn blank_website_is_allowed() {
        let mut s = suggestion();
        s.website = Some(String::new());
        assert!(validate_club_suggestion(&s).is_ok());
    }

    #[test]
    fn update_only_checks_present_fields() {
        let update = ClubUpdate { slug: Some("Bad Slug".to_owned()), ..ClubUpdate::default() };
        assert_eq!(fields(validate_club_update(&update)), vec!["slug"]);
        assert!(validate_club_update(&ClubUpdate::default()).is_ok());
    }

    #[test]
    fn slug_must_not_be_empty() {
        assert_eq!(fields(validate_slug("")), vec!["slug"]);
        assert!(validate_slug("drc").is_ok());
        assert!(validate_slug("denver-rc-2").is_ok());
    }

    #[test]
    fn event_end_before_start_is_rejected() {
        let start = Utc::now();
        let draft = EventDraft {
            name: "Field Day".to_owned(),
            description: "24 hours of portable operation.".to_owned(),
            start_time: start,
            end_time: start - Duration::minutes(1),
        };
        assert_eq!(fields(validate_event(&draft)), vec!["endTime"]);
    }

    #[test]
    fn profile_callsign_length_bounds() {
        let mut profile = UserProfile {
            name: "Jo".to_owned(),
            callsign: "w0jd".to_owned(),
            email: None,
        };
        assert!(validate_profile(&profile).is_ok());
        profile.callsign = "W0".to_owned();
        assert_eq!(fields(validate_profile(&profile)), vec!["callsign"]);
        profile.callsign = "KD0ABCDE".to_owned();
        assert_eq!(fields(validate_profile(&profile)), vec!["callsign"]);
    }

    #[test]
    fn logo_must_be_small_image() {
        assert!(validate_logo("logo.PNG", 1024).is_ok());
        assert_eq!(fields(validate_logo("logo.svg", 1024)), vec!["filename"]);
        assert_eq!(fields(validate_logo("logo.gif", MAX_LOGO_BYTES + 1)), vec!["file"]);
        assert_eq!(fields(validate_logo("logo", 0)), vec!["filename", "file"]);
    }

    proptest::proptest! {
        #[test]
        fn proptest_alphanumeric_club_callsigns_up_to_ten_pass(
            callsign in "[A-Za-z0-9]{1,10}",
        ) {
            let mut s = suggestion();
            s.callsign = callsign;
            proptest::prop_assert!(validate_club_suggestion(&s).is_ok());
        }

        #[test]
        fn proptest_callsigns_with_punctuation_fail(
            prefix in "[A-Z0-9]{0,4}",
            punct in "[-/ .!]",
            suffix in "[A-Z0-9]{0,4}",
        ) {
            let mut s = suggestion();
            s.callsign = format!("{prefix}{punct}{suffix}");
            proptest::prop_assert!(validate_club_suggestion(&s).is_err());
        }
    }
}
