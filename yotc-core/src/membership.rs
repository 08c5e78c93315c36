//! Club membership records and their lifecycle.
//!
//! A membership lives at `clubs/{club_id}/memberships/{user_id}`, so its
//! document ID is the member's user ID. Status moves through a small
//! transition table:
//!
//! ```text
//!            approve            deactivate
//!  pending ──────────▶ active ────────────▶ inactive
//!     │                 ▲  │
//!     │ deny    promote │  │ demote
//!     ▼                 │  ▼
//!  denied          (role: member ⇄ leader)
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::{ClubId, UserId};
use crate::timestamp::{deserialize_optional, deserialize_or_now};

/// Role a user holds within a club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum MembershipRole {
    /// Regular club member.
    Member,
    /// Club leader with approval permissions.
    Leader,
}

impl fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Member => "member",
            Self::Leader => "leader",
        })
    }
}

/// Lifecycle status of a membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum MembershipStatus {
    /// Application submitted, awaiting approval.
    Pending,
    /// Membership approved and active.
    Active,
    /// Membership denied.
    Denied,
    /// Membership revoked or the user left.
    Inactive,
}

impl MembershipStatus {
    /// Wire value as stored in documents and used in queries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Denied => "denied",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operation that moves a membership between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum MembershipAction {
    Approve,
    Deny,
    Deactivate,
    Promote,
    Demote,
}

impl fmt::Display for MembershipAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Approve => "approve",
            Self::Deny => "deny",
            Self::Deactivate => "deactivate",
            Self::Promote => "promote",
            Self::Demote => "demote",
        })
    }
}

/// Resolves the `(status, role)` a membership ends up in after `action`.
///
/// # Errors
/// Returns [`CoreError::InvalidTransition`] when the action is not permitted
/// from the current state.
pub fn transition(
    status: MembershipStatus,
    role: MembershipRole,
    action: MembershipAction,
) -> Result<(MembershipStatus, MembershipRole), CoreError> {
    use MembershipAction as A;
    use MembershipRole as R;
    use MembershipStatus as S;

    match (status, role, action) {
        (S::Pending, role, A::Approve) => Ok((S::Active, role)),
        (S::Pending, role, A::Deny) => Ok((S::Denied, role)),
        (S::Active, _, A::Deactivate) => Ok((S::Inactive, R::Member)),
        (S::Active, R::Member, A::Promote) => Ok((S::Active, R::Leader)),
        (S::Active, R::Leader, A::Demote) => Ok((S::Active, R::Member)),
        (status, role, action) => Err(CoreError::InvalidTransition { status, role, action }),
    }
}

/// A user's relationship with a club.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ClubMembership {
    /// Document ID; always equal to `user_id`.
    pub id: UserId,
    pub user_id: UserId,
    pub club_id: ClubId,
    pub role: MembershipRole,
    pub status: MembershipStatus,
    /// When the membership was requested.
    #[serde(default = "Utc::now", deserialize_with = "deserialize_or_now")]
    pub applied_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_optional")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<UserId>,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_or_now")]
    pub updated_at: DateTime<Utc>,
}

impl ClubMembership {
    /// A fresh pending application with the `member` role.
    #[must_use]
    pub fn apply(user_id: UserId, club_id: ClubId, now: DateTime<Utc>) -> Self {
        Self {
            id: user_id.clone(),
            user_id,
            club_id,
            role: MembershipRole::Member,
            status: MembershipStatus::Pending,
            applied_at: now,
            approved_at: None,
            approved_by: None,
            updated_at: now,
        }
    }

    /// Approves a pending application on behalf of `approved_by`.
    ///
    /// # Errors
    /// [`CoreError::InvalidTransition`] unless the membership is pending.
    pub fn approve(&mut self, approved_by: UserId, now: DateTime<Utc>) -> Result<(), CoreError> {
        self.apply_action(MembershipAction::Approve, now)?;
        self.approved_at = Some(now);
        self.approved_by = Some(approved_by);
        Ok(())
    }

    /// Applies any action that only changes status, role and `updated_at`.
    ///
    /// # Errors
    /// [`CoreError::InvalidTransition`] if the transition table forbids it.
    pub fn apply_action(
        &mut self,
        action: MembershipAction,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let (status, role) = transition(self.status, self.role, action)?;
        self.status = status;
        self.role = role;
        self.updated_at = now;
        Ok(())
    }

    /// Whether this membership currently grants member rights.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }
}
