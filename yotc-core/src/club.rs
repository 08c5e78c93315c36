use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{ClubId, UserId};
use crate::timestamp::deserialize_or_now;

/// An amateur radio club in the section.
///
/// Clubs suggested by users start inactive and without a slug; an admin
/// assigns the slug and activates the club.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Club {
    pub id: ClubId,
    pub name: String,
    pub description: String,
    /// The club's main callsign.
    pub callsign: String,
    /// Physical or meeting location.
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    /// Storage path of the current logo, kept so the blob can be removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_path: Option<String>,
    /// URL-friendly key used in routes. Empty until an admin sets it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub is_active: bool,
    /// The user who suggested the club, if it was user-submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_by: Option<UserId>,
    /// Users with leader rights over this club.
    #[serde(default)]
    pub leader_ids: Vec<UserId>,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_or_now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_or_now")]
    pub updated_at: DateTime<Utc>,
}

impl Club {
    /// A new inactive club built from a user's suggestion.
    #[must_use]
    pub fn suggested(
        id: ClubId,
        suggestion: ClubSuggestion,
        suggested_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: suggestion.name,
            description: suggestion.description,
            callsign: suggestion.callsign,
            location: suggestion.location,
            website: suggestion.website.filter(|w| !w.trim().is_empty()),
            logo_url: None,
            logo_path: None,
            slug: Some(String::new()),
            is_active: false,
            suggested_by: Some(suggested_by),
            leader_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `user_id` is listed as a leader of this club.
    #[must_use]
    pub fn is_leader(&self, user_id: &UserId) -> bool {
        self.leader_ids.contains(user_id)
    }

    /// The club's slug, if one has been assigned.
    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref().filter(|s| !s.is_empty())
    }
}

/// User-submitted details for a club that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubSuggestion {
    pub name: String,
    pub callsign: String,
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub website: Option<String>,
}

/// Partial edit of a club's details. `None` leaves a field untouched; an
/// empty `website` clears it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callsign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl ClubUpdate {
    /// Returns `true` if no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
