//! Who may do what.
//!
//! There are two kinds of elevated users: admins, flagged by an `admin`
//! claim from the identity provider, and club leaders, listed in a club's
//! `leader_ids`. Leader rights are scoped to that one club.

use crate::club::Club;
use crate::error::CoreError;
use crate::id::UserId;

/// The authenticated caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    /// Set from the identity provider's `admin` claim.
    pub is_admin: bool,
}

impl Principal {
    /// A regular (non-admin) user.
    pub fn user(user_id: impl Into<UserId>) -> Self {
        Self { user_id: user_id.into(), is_admin: false }
    }

    /// An application administrator.
    pub fn admin(user_id: impl Into<UserId>) -> Self {
        Self { user_id: user_id.into(), is_admin: true }
    }

    /// Admins and the club's leaders may approve or deny membership requests.
    #[must_use]
    pub fn can_approve_memberships(&self, club: &Club) -> bool {
        self.is_admin || club.is_leader(&self.user_id)
    }

    /// Admins and the club's leaders may edit the club and its events.
    #[must_use]
    pub fn can_manage_club(&self, club: &Club) -> bool {
        self.can_approve_memberships(club)
    }

    /// Only admins may promote or demote members.
    #[must_use]
    pub fn can_manage_roles(&self) -> bool {
        self.is_admin
    }

    /// Only admins review club suggestions.
    #[must_use]
    pub fn can_review_suggestions(&self) -> bool {
        self.is_admin
    }

    /// Turns a permission check into a `Result`.
    ///
    /// # Errors
    /// [`CoreError::Forbidden`] when `allowed` is `false`.
    pub fn ensure(&self, allowed: bool, action: &'static str) -> Result<(), CoreError> {
        if allowed {
            Ok(())
        } else {
            Err(CoreError::Forbidden { user_id: self.user_id.clone(), action })
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::club::ClubSuggestion;
    use crate::id::ClubId;

    fn club_led_by(leader: &str) -> Club {
        let mut club = Club::suggested(
            ClubId::new("c1"),
            ClubSuggestion::default(),
            UserId::new("someone"),
            Utc::now(),
        );
        club.leader_ids.push(UserId::new(leader));
        club
    }

    #[test]
    fn leaders_approve_only_their_own_club() {
        let club = club_led_by("leader");
        assert!(Principal::user("leader").can_approve_memberships(&club));
        assert!(!Principal::user("member").can_approve_memberships(&club));
        assert!(Principal::admin("root").can_approve_memberships(&club));
    }

    #[test]
    fn role_management_is_admin_only() {
        assert!(!Principal::user("leader").can_manage_roles());
        assert!(Principal::admin("root").can_manage_roles());
    }

    #[test]
    fn ensure_reports_user_and_action() {
        let err = Principal::user("u9").ensure(false, "review club suggestions");
        match err {
            Err(CoreError::Forbidden { user_id, action }) => {
                assert_eq!(user_id, UserId::new("u9"));
                assert_eq!(action, "review club suggestions");
            }
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }
}
