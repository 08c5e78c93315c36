//! Document and collection paths.
//!
//! ```text
//! clubs/{club}
//! clubs/{club}/memberships/{user}
//! clubs/{club}/events/{event}
//! clubs/{club}/events/{event}/rsvps/{user}
//! clubs/{club}/events/{event}/documents/{log}
//! users/{user}
//! ```

use yotc_core::{ClubId, EventId, LogId, UserId};

use crate::error::StoreError;

pub const CLUBS: &str = "clubs";
pub const USERS: &str = "users";
pub const MEMBERSHIPS: &str = "memberships";
pub const EVENTS: &str = "events";
pub const RSVPS: &str = "rsvps";
pub const DOCUMENTS: &str = "documents";

#[must_use]
pub fn club(club: &ClubId) -> String {
    format!("{CLUBS}/{club}")
}

#[must_use]
pub fn user(user: &UserId) -> String {
    format!("{USERS}/{user}")
}

#[must_use]
pub fn memberships(club: &ClubId) -> String {
    format!("{CLUBS}/{club}/{MEMBERSHIPS}")
}

#[must_use]
pub fn membership(club: &ClubId, user: &UserId) -> String {
    format!("{}/{user}", memberships(club))
}

#[must_use]
pub fn events(club: &ClubId) -> String {
    format!("{CLUBS}/{club}/{EVENTS}")
}

#[must_use]
pub fn event(club: &ClubId, event: &EventId) -> String {
    format!("{}/{event}", events(club))
}

#[must_use]
pub fn rsvps(club: &ClubId, event_id: &EventId) -> String {
    format!("{}/{RSVPS}", event(club, event_id))
}

#[must_use]
pub fn rsvp(club: &ClubId, event_id: &EventId, user: &UserId) -> String {
    format!("{}/{user}", rsvps(club, event_id))
}

#[must_use]
pub fn event_logs(club: &ClubId, event_id: &EventId) -> String {
    format!("{}/{DOCUMENTS}", event(club, event_id))
}

#[must_use]
pub fn event_log(club: &ClubId, event_id: &EventId, log: &LogId) -> String {
    format!("{}/{log}", event_logs(club, event_id))
}

/// Splits a path into segments, rejecting empty segments.
///
/// # Errors
/// [`StoreError::InvalidPath`] for empty paths or `//`.
pub fn segments(path: &str) -> Result<Vec<&str>, StoreError> {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.iter().any(|s| s.is_empty()) {
        return Err(StoreError::InvalidPath {
            path: path.to_owned(),
            reason: "empty path segment",
        });
    }
    Ok(parts)
}

/// Checks that `path` names a document (an even number of segments).
///
/// # Errors
/// [`StoreError::InvalidPath`] otherwise.
pub fn ensure_document_path(path: &str) -> Result<(), StoreError> {
    if segments(path)?.len() % 2 == 0 {
        Ok(())
    } else {
        Err(StoreError::InvalidPath { path: path.to_owned(), reason: "not a document path" })
    }
}

/// Checks that `path` names a collection (an odd number of segments).
///
/// # Errors
/// [`StoreError::InvalidPath`] otherwise.
pub fn ensure_collection_path(path: &str) -> Result<(), StoreError> {
    if segments(path)?.len() % 2 == 1 {
        Ok(())
    } else {
        Err(StoreError::InvalidPath { path: path.to_owned(), reason: "not a collection path" })
    }
}

/// Splits a document path into `(parent collection, document id)`.
#[must_use]
pub fn split_document_path(path: &str) -> Option<(&str, &str)> {
    path.rsplit_once('/')
}
