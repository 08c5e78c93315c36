use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{ClubId, EventId, LogId, UserId};
use crate::timestamp::deserialize_or_now;

/// An activity hosted by a club.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Event {
    pub id: EventId,
    /// The hosting club.
    pub club_id: ClubId,
    pub name: String,
    pub description: String,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_or_now")]
    pub start_time: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_or_now")]
    pub end_time: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_or_now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_or_now")]
    pub updated_at: DateTime<Utc>,
    /// The user who created the event.
    pub created_by: UserId,
}

impl Event {
    /// Builds a new event record for `club_id` from a validated draft.
    #[must_use]
    pub fn new(
        id: EventId,
        club_id: ClubId,
        draft: EventDraft,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            club_id,
            name: draft.name,
            description: draft.description,
            start_time: draft.start_time,
            end_time: draft.end_time,
            created_at: now,
            updated_at: now,
            created_by,
        }
    }
}

/// The editable fields of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Partial edit of an event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl EventUpdate {
    /// The draft that results from applying this update to `event`.
    #[must_use]
    pub fn merged_with(&self, event: &Event) -> EventDraft {
        EventDraft {
            name: self.name.clone().unwrap_or_else(|| event.name.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| event.description.clone()),
            start_time: self.start_time.unwrap_or(event.start_time),
            end_time: self.end_time.unwrap_or(event.end_time),
        }
    }
}

/// A user's RSVP to a club event, keyed by the user's ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct EventRsvp {
    pub id: UserId,
    pub event_id: EventId,
    pub user_id: UserId,
    /// Denormalised for collection-group queries.
    pub club_id: ClubId,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_or_now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_or_now")]
    pub updated_at: DateTime<Utc>,
}

impl EventRsvp {
    #[must_use]
    pub fn new(club_id: ClubId, event_id: EventId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: user_id.clone(),
            event_id,
            user_id,
            club_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A contest log (ADIF) uploaded for an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct EventLog {
    pub id: LogId,
    pub event_id: EventId,
    pub club_id: ClubId,
    pub uploaded_by: UserId,
    /// Path of the file in blob storage.
    pub storage_path: String,
    pub download_url: String,
    /// Original filename as uploaded.
    pub filename: String,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_or_now")]
    pub uploaded_at: DateTime<Utc>,
}

impl EventLog {
    #[must_use]
    #[expect(clippy::too_many_arguments, reason = "mirrors the stored record field for field")]
    pub fn new(
        id: LogId,
        club_id: ClubId,
        event_id: EventId,
        uploaded_by: UserId,
        storage_path: String,
        download_url: String,
        filename: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            event_id,
            club_id,
            uploaded_by,
            storage_path,
            download_url,
            filename,
            uploaded_at: now,
        }
    }
}
