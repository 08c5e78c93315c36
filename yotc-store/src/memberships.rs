//! Club membership applications and role changes.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use yotc_core::{
    Club, ClubId, ClubMembership, MembershipAction, MembershipRole, MembershipStatus, Principal,
    User, UserId,
};

use crate::backend::DocumentStore;
use crate::clubs::write_leader_ids;
use crate::codec::{self, decode_all, encode};
use crate::error::StoreError;
use crate::paths;
use crate::query::{Direction, Query};

/// A membership joined with the member's profile, if they have one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub membership: ClubMembership,
    pub user: Option<User>,
}

/// Moves memberships through their lifecycle.
#[derive(Clone)]
pub struct MembershipService {
    store: Arc<dyn DocumentStore>,
}

impl MembershipService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Every membership the user holds in any club, in any state.
    ///
    /// # Errors
    /// Store failures.
    pub async fn user_memberships(&self, user: &UserId) -> Result<Vec<ClubMembership>, StoreError> {
        let q = Query::group(paths::MEMBERSHIPS).where_eq("userId", user.as_str());
        Ok(decode_all(self.store.query(&q).await?))
    }

    /// Submits a pending application for the caller.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the club does not exist or is not yet
    /// active, [`StoreError::Conflict`] if the caller already has a
    /// membership record for the club.
    pub async fn apply(
        &self,
        principal: &Principal,
        club_id: &ClubId,
    ) -> Result<ClubMembership, StoreError> {
        let club_path = paths::club(club_id);
        let club: Option<Club> = codec::load(self.store.as_ref(), &club_path).await?;
        if !club.is_some_and(|c| c.is_active) {
            return Err(StoreError::not_found(club_path));
        }
        let path = paths::membership(club_id, &principal.user_id);
        if let Some(existing) = codec::load::<ClubMembership>(self.store.as_ref(), &path).await? {
            return Err(StoreError::Conflict(format!(
                "membership already exists with status {}",
                existing.status
            )));
        }
        let membership = ClubMembership::apply(principal.user_id.clone(), club_id.clone(), Utc::now());
        self.store.set(&path, encode(&membership)?).await?;
        tracing::info!(club_id = %club_id, user_id = %principal.user_id, "membership requested");
        Ok(membership)
    }

    /// The user's membership in `club_id`, if any. Lookup failures are
    /// logged and reported as no membership.
    pub async fn existing_membership(&self, user: &UserId, club_id: &ClubId) -> Option<ClubMembership> {
        match codec::load(self.store.as_ref(), &paths::membership(club_id, user)).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(club_id = %club_id, user_id = %user, error = %e, "membership lookup failed");
                None
            }
        }
    }

    /// Applications awaiting review, oldest first.
    ///
    /// # Errors
    /// [`yotc_core::CoreError::Forbidden`] unless admin or club leader,
    /// [`StoreError::NotFound`] if the club does not exist.
    pub async fn pending_memberships(
        &self,
        principal: &Principal,
        club_id: &ClubId,
    ) -> Result<Vec<ClubMembership>, StoreError> {
        let club = self.club(club_id).await?;
        principal.ensure(principal.can_approve_memberships(&club), "review membership requests")?;
        self.with_status(club_id, MembershipStatus::Pending).await
    }

    /// Current members, in order of application.
    ///
    /// # Errors
    /// Store failures.
    pub async fn active_members(&self, club_id: &ClubId) -> Result<Vec<ClubMembership>, StoreError> {
        self.with_status(club_id, MembershipStatus::Active).await
    }

    /// # Errors
    /// [`yotc_core::CoreError::Forbidden`] unless admin or club leader,
    /// [`yotc_core::CoreError::InvalidTransition`] unless pending.
    pub async fn approve(
        &self,
        principal: &Principal,
        club_id: &ClubId,
        user: &UserId,
    ) -> Result<ClubMembership, StoreError> {
        let club = self.club(club_id).await?;
        principal.ensure(principal.can_approve_memberships(&club), "approve memberships")?;
        let path = paths::membership(club_id, user);
        let mut membership: ClubMembership = codec::require(self.store.as_ref(), &path).await?;
        membership.approve(principal.user_id.clone(), Utc::now())?;
        self.store.set(&path, encode(&membership)?).await?;
        tracing::info!(club_id = %club_id, user_id = %user, approved_by = %principal.user_id, "membership approved");
        Ok(membership)
    }

    /// # Errors
    /// [`yotc_core::CoreError::Forbidden`] unless admin or club leader,
    /// [`yotc_core::CoreError::InvalidTransition`] unless pending.
    pub async fn deny(
        &self,
        principal: &Principal,
        club_id: &ClubId,
        user: &UserId,
    ) -> Result<ClubMembership, StoreError> {
        let club = self.club(club_id).await?;
        principal.ensure(principal.can_approve_memberships(&club), "deny memberships")?;
        self.act(club_id, user, MembershipAction::Deny).await
    }

    /// Ends an active membership. Members may end their own; admins and
    /// leaders may end anyone's. A departing leader loses leader rights.
    ///
    /// # Errors
    /// [`yotc_core::CoreError::Forbidden`],
    /// [`yotc_core::CoreError::InvalidTransition`] unless active.
    pub async fn deactivate(
        &self,
        principal: &Principal,
        club_id: &ClubId,
        user: &UserId,
    ) -> Result<ClubMembership, StoreError> {
        let club = self.club(club_id).await?;
        let allowed = principal.user_id == *user || principal.can_approve_memberships(&club);
        principal.ensure(allowed, "revoke this membership")?;
        let membership = self.act(club_id, user, MembershipAction::Deactivate).await?;
        if club.is_leader(user) {
            let leaders: Vec<UserId> = club.leader_ids.into_iter().filter(|id| id != user).collect();
            write_leader_ids(self.store.as_ref(), club_id, &leaders).await?;
        }
        Ok(membership)
    }

    /// Makes an active member a club leader.
    ///
    /// The membership is written first, then the club's leader list; the
    /// two writes are not atomic.
    ///
    /// # Errors
    /// [`yotc_core::CoreError::Forbidden`] for non-admins,
    /// [`yotc_core::CoreError::InvalidTransition`] unless an active member.
    pub async fn promote_to_leader(
        &self,
        principal: &Principal,
        club_id: &ClubId,
        user: &UserId,
    ) -> Result<ClubMembership, StoreError> {
        principal.ensure(principal.can_manage_roles(), "promote members")?;
        let club = self.club(club_id).await?;
        let membership = self.act(club_id, user, MembershipAction::Promote).await?;
        let mut leaders = club.leader_ids;
        if !leaders.contains(user) {
            leaders.push(user.clone());
        }
        write_leader_ids(self.store.as_ref(), club_id, &leaders).await?;
        Ok(membership)
    }

    /// Returns a leader to the member role; see [`Self::promote_to_leader`].
    ///
    /// # Errors
    /// [`yotc_core::CoreError::Forbidden`] for non-admins,
    /// [`yotc_core::CoreError::InvalidTransition`] unless an active leader.
    pub async fn demote_to_member(
        &self,
        principal: &Principal,
        club_id: &ClubId,
        user: &UserId,
    ) -> Result<ClubMembership, StoreError> {
        principal.ensure(principal.can_manage_roles(), "demote leaders")?;
        let club = self.club(club_id).await?;
        let membership = self.act(club_id, user, MembershipAction::Demote).await?;
        let leaders: Vec<UserId> = club.leader_ids.into_iter().filter(|id| id != user).collect();
        write_leader_ids(self.store.as_ref(), club_id, &leaders).await?;
        Ok(membership)
    }

    /// Active and pending memberships with member profiles, leaders first.
    ///
    /// # Errors
    /// [`yotc_core::CoreError::Forbidden`] unless admin or club leader.
    pub async fn roster(
        &self,
        principal: &Principal,
        club_id: &ClubId,
    ) -> Result<Vec<RosterEntry>, StoreError> {
        let club = self.club(club_id).await?;
        principal.ensure(principal.can_approve_memberships(&club), "view the roster")?;
        let mut memberships = self.with_status(club_id, MembershipStatus::Active).await?;
        memberships.extend(self.with_status(club_id, MembershipStatus::Pending).await?);
        memberships.sort_by_key(|m| (m.status != MembershipStatus::Active, m.role != MembershipRole::Leader));

        let mut roster = Vec::with_capacity(memberships.len());
        for membership in memberships {
            let user = match codec::load(self.store.as_ref(), &paths::user(&membership.user_id)).await {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!(user_id = %membership.user_id, error = %e, "roster user lookup failed");
                    None
                }
            };
            roster.push(RosterEntry { membership, user });
        }
        Ok(roster)
    }

    async fn club(&self, club_id: &ClubId) -> Result<Club, StoreError> {
        codec::require(self.store.as_ref(), &paths::club(club_id)).await
    }

    async fn with_status(
        &self,
        club_id: &ClubId,
        status: MembershipStatus,
    ) -> Result<Vec<ClubMembership>, StoreError> {
        let q = Query::collection(paths::memberships(club_id))
            .where_eq("status", status.as_str())
            .order_by("appliedAt", Direction::Ascending);
        Ok(decode_all(self.store.query(&q).await?))
    }

    async fn act(
        &self,
        club_id: &ClubId,
        user: &UserId,
        action: MembershipAction,
    ) -> Result<ClubMembership, StoreError> {
        let path = paths::membership(club_id, user);
        let mut membership: ClubMembership = codec::require(self.store.as_ref(), &path).await?;
        membership.apply_action(action, Utc::now())?;
        self.store.set(&path, encode(&membership)?).await?;
        tracing::info!(club_id = %club_id, user_id = %user, %action, status = %membership.status, "membership updated");
        Ok(membership)
    }
}
