//! Integration test: a club goes from suggestion to an active roster.
//!
//! Drives every membership transition through [`Clubhouse`] against an
//! in-memory store, checking permissions and leader bookkeeping.

use std::sync::Arc;

use yotc_core::{
    ClubId, ClubSuggestion, CoreError, MembershipRole, MembershipStatus, Principal, UserId,
    UserProfile,
};
use yotc_store::{Clubhouse, LocalBlobStorage, MemoryStore, StoreError};

fn hub() -> Clubhouse {
    Clubhouse::new(
        Arc::new(MemoryStore::new()),
        Arc::new(LocalBlobStorage::new("/tmp/yotc-unused", "http://localhost/blobs")),
    )
}

async fn active_club(hub: &Clubhouse) -> ClubId {
    let suggestion = ClubSuggestion {
        name: "Denver Radio Club".to_owned(),
        callsign: "W0TX".to_owned(),
        description: "Serving the Denver metro since 1917.".to_owned(),
        location: "Denver, CO".to_owned(),
        website: Some("https://w0tx.org".to_owned()),
    };
    let club = hub
        .clubs()
        .suggest_club(suggestion, &Principal::user("founder"))
        .await
        .unwrap_or_else(|e| panic!("suggest failed: {e}"));
    hub.clubs()
        .approve_club(&Principal::admin("root"), &club.id, None)
        .await
        .unwrap_or_else(|e| panic!("approve failed: {e}"));
    club.id
}

fn is_forbidden<T>(result: &Result<T, StoreError>) -> bool {
    matches!(result, Err(StoreError::Core(CoreError::Forbidden { .. })))
}

fn is_invalid_transition<T>(result: &Result<T, StoreError>) -> bool {
    matches!(result, Err(StoreError::Core(CoreError::InvalidTransition { .. })))
}

#[tokio::test]
async fn applicant_becomes_leader_and_steps_down() {
    let hub = hub();
    let club = active_club(&hub).await;
    let admin = Principal::admin("root");
    let alice = Principal::user("alice");
    let alice_id = UserId::new("alice");

    let applied = hub.memberships().apply(&alice, &club).await;
    assert!(matches!(&applied, Ok(m) if m.status == MembershipStatus::Pending));

    let pending = hub
        .memberships()
        .pending_memberships(&admin, &club)
        .await
        .unwrap_or_else(|e| panic!("pending failed: {e}"));
    assert_eq!(pending.len(), 1);

    let approved = hub
        .memberships()
        .approve(&admin, &club, &alice_id)
        .await
        .unwrap_or_else(|e| panic!("approve failed: {e}"));
    assert_eq!(approved.status, MembershipStatus::Active);
    assert_eq!(approved.approved_by, Some(UserId::new("root")));

    let promoted = hub
        .memberships()
        .promote_to_leader(&admin, &club, &alice_id)
        .await
        .unwrap_or_else(|e| panic!("promote failed: {e}"));
    assert_eq!(promoted.role, MembershipRole::Leader);
    let stored = hub.clubs().club_by_id(&club).await.ok().flatten();
    assert!(stored.is_some_and(|c| c.is_leader(&alice_id)), "promotion must add to leaderIds");

    let demoted = hub
        .memberships()
        .demote_to_member(&admin, &club, &alice_id)
        .await
        .unwrap_or_else(|e| panic!("demote failed: {e}"));
    assert_eq!(demoted.role, MembershipRole::Member);
    let stored = hub.clubs().club_by_id(&club).await.ok().flatten();
    assert!(stored.is_some_and(|c| c.leader_ids.is_empty()), "demotion must remove from leaderIds");
}

#[tokio::test]
async fn leaders_approve_but_only_admins_change_roles() {
    let hub = hub();
    let club = active_club(&hub).await;
    let admin = Principal::admin("root");
    let leader = Principal::user("lead");
    let lead_id = UserId::new("lead");
    let bob_id = UserId::new("bob");

    assert!(hub.memberships().apply(&leader, &club).await.is_ok());
    assert!(hub.memberships().approve(&admin, &club, &lead_id).await.is_ok());
    assert!(hub.memberships().promote_to_leader(&admin, &club, &lead_id).await.is_ok());

    assert!(hub.memberships().apply(&Principal::user("bob"), &club).await.is_ok());
    assert!(is_forbidden(&hub.memberships().approve(&Principal::user("bob"), &club, &bob_id).await));
    assert!(hub.memberships().approve(&leader, &club, &bob_id).await.is_ok());
    assert!(is_forbidden(&hub.memberships().promote_to_leader(&leader, &club, &bob_id).await));

    let active = hub
        .memberships()
        .active_members(&club)
        .await
        .unwrap_or_else(|e| panic!("active failed: {e}"));
    assert_eq!(active.len(), 2);
}

#[tokio::test]
async fn only_leaders_and_admins_deny_applications() {
    let hub = hub();
    let club = active_club(&hub).await;
    let admin = Principal::admin("root");
    let dave_id = UserId::new("dave");

    assert!(hub.memberships().apply(&Principal::user("erin"), &club).await.is_ok());
    assert!(hub.memberships().approve(&admin, &club, &UserId::new("erin")).await.is_ok());
    assert!(hub.memberships().apply(&Principal::user("dave"), &club).await.is_ok());

    for outsider in [Principal::user("erin"), Principal::user("dave"), Principal::user("mallory")] {
        assert!(
            is_forbidden(&hub.memberships().deny(&outsider, &club, &dave_id).await),
            "{} must not deny applications",
            outsider.user_id
        );
    }
    let still_pending = hub.memberships().existing_membership(&dave_id, &club).await;
    assert_eq!(still_pending.map(|m| m.status), Some(MembershipStatus::Pending));

    let lead_id = UserId::new("lead");
    assert!(hub.memberships().apply(&Principal::user("lead"), &club).await.is_ok());
    assert!(hub.memberships().approve(&admin, &club, &lead_id).await.is_ok());
    assert!(hub.memberships().promote_to_leader(&admin, &club, &lead_id).await.is_ok());
    let denied = hub
        .memberships()
        .deny(&Principal::user("lead"), &club, &dave_id)
        .await
        .unwrap_or_else(|e| panic!("deny failed: {e}"));
    assert_eq!(denied.status, MembershipStatus::Denied);
}

#[tokio::test]
async fn invalid_transitions_are_rejected() {
    let hub = hub();
    let club = active_club(&hub).await;
    let admin = Principal::admin("root");
    let carol_id = UserId::new("carol");

    assert!(hub.memberships().apply(&Principal::user("carol"), &club).await.is_ok());
    assert!(is_invalid_transition(&hub.memberships().promote_to_leader(&admin, &club, &carol_id).await));
    assert!(is_invalid_transition(&hub.memberships().deactivate(&admin, &club, &carol_id).await));
    assert!(hub.memberships().deny(&admin, &club, &carol_id).await.is_ok());
    assert!(is_invalid_transition(&hub.memberships().approve(&admin, &club, &carol_id).await));

    let existing = hub.memberships().existing_membership(&carol_id, &club).await;
    assert_eq!(existing.map(|m| m.status), Some(MembershipStatus::Denied));
}

#[tokio::test]
async fn applying_twice_or_to_inactive_club_fails() {
    let hub = hub();
    let club = active_club(&hub).await;
    let dave = Principal::user("dave");
    assert!(hub.memberships().apply(&dave, &club).await.is_ok());
    assert!(matches!(hub.memberships().apply(&dave, &club).await, Err(StoreError::Conflict(_))));

    let suggested = hub
        .clubs()
        .suggest_club(
            ClubSuggestion {
                name: "Boulder Amateur Radio Club".to_owned(),
                callsign: "W0DK".to_owned(),
                description: "Boulder County hams since 1951.".to_owned(),
                location: "Boulder, CO".to_owned(),
                website: None,
            },
            &dave,
        )
        .await
        .unwrap_or_else(|e| panic!("suggest failed: {e}"));
    assert!(matches!(
        hub.memberships().apply(&dave, &suggested.id).await,
        Err(StoreError::NotFound { .. })
    ));
}

#[tokio::test]
async fn leaving_club_drops_leader_rights() {
    let hub = hub();
    let club = active_club(&hub).await;
    let admin = Principal::admin("root");
    let erin = Principal::user("erin");
    let erin_id = UserId::new("erin");

    assert!(hub.memberships().apply(&erin, &club).await.is_ok());
    assert!(hub.memberships().approve(&admin, &club, &erin_id).await.is_ok());
    assert!(hub.memberships().promote_to_leader(&admin, &club, &erin_id).await.is_ok());
    assert!(is_forbidden(&hub.memberships().deactivate(&Principal::user("frank"), &club, &erin_id).await));

    let left = hub
        .memberships()
        .deactivate(&erin, &club, &erin_id)
        .await
        .unwrap_or_else(|e| panic!("leave failed: {e}"));
    assert_eq!(left.status, MembershipStatus::Inactive);
    assert_eq!(left.role, MembershipRole::Member);
    let stored = hub.clubs().club_by_id(&club).await.ok().flatten();
    assert!(stored.is_some_and(|c| !c.is_leader(&erin_id)));
}

#[tokio::test]
async fn roster_joins_profiles_and_lists_memberships_across_clubs() {
    let hub = hub();
    let club = active_club(&hub).await;
    let admin = Principal::admin("root");
    let gina_id = UserId::new("gina");
    hub.users()
        .save_user(&gina_id, UserProfile { name: "Gina".to_owned(), callsign: "K0GNA".to_owned(), email: None })
        .await
        .unwrap_or_else(|e| panic!("save failed: {e}"));

    assert!(hub.memberships().apply(&Principal::user("gina"), &club).await.is_ok());
    assert!(hub.memberships().approve(&admin, &club, &gina_id).await.is_ok());
    assert!(hub.memberships().apply(&Principal::user("ghost"), &club).await.is_ok());

    let roster = hub
        .memberships()
        .roster(&admin, &club)
        .await
        .unwrap_or_else(|e| panic!("roster failed: {e}"));
    assert_eq!(roster.len(), 2);
    assert_eq!(roster[0].membership.status, MembershipStatus::Active);
    assert_eq!(roster[0].user.as_ref().map(|u| u.display_name()), Some("Gina (K0GNA)".to_owned()));
    assert!(roster[1].user.is_none(), "users without a profile join as None");

    let mine = hub
        .memberships()
        .user_memberships(&gina_id)
        .await
        .unwrap_or_else(|e| panic!("user memberships failed: {e}"));
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].club_id, club);
}
