use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::UserId;
use crate::timestamp::deserialize_or_now;

/// A registered user.
///
/// Profiles are written incrementally, so every field tolerates being
/// absent from the stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    /// Amateur radio callsign.
    #[serde(default)]
    pub callsign: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_or_now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_or_now")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// `true` once the user has provided both a name and a callsign.
    #[must_use]
    pub fn is_profile_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.callsign.trim().is_empty()
    }

    /// Label shown in attendee lists, e.g. `"Jane Doe (W0JD)"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.callsign)
    }
}

/// Self-service profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub callsign: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
