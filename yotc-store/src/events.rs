//! Club events.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use yotc_core::validate::validate_event;
use yotc_core::{Club, ClubId, Event, EventDraft, EventId, EventUpdate, Principal};

use crate::backend::DocumentStore;
use crate::codec::{self, decode_all, encode};
use crate::error::StoreError;
use crate::paths;
use crate::query::{Direction, Query};

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn DocumentStore>,
}

impl EventService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// A club's events, soonest first.
    ///
    /// # Errors
    /// Store failures.
    pub async fn club_events(&self, club_id: &ClubId) -> Result<Vec<Event>, StoreError> {
        let q = Query::collection(paths::events(club_id)).order_by("startTime", Direction::Ascending);
        Ok(decode_all(self.store.query(&q).await?))
    }

    /// Events across every club, soonest first.
    ///
    /// # Errors
    /// Store failures.
    pub async fn all_events(&self) -> Result<Vec<Event>, StoreError> {
        let q = Query::group(paths::EVENTS).order_by("startTime", Direction::Ascending);
        Ok(decode_all(self.store.query(&q).await?))
    }

    /// # Errors
    /// Store failures.
    pub async fn get_event(&self, club_id: &ClubId, event_id: &EventId) -> Result<Option<Event>, StoreError> {
        codec::load(self.store.as_ref(), &paths::event(club_id, event_id)).await
    }

    /// Creates an event and returns it with its generated ID.
    ///
    /// # Errors
    /// [`yotc_core::CoreError::Forbidden`] unless admin or club leader,
    /// [`yotc_core::CoreError::Validation`], [`StoreError::NotFound`] if
    /// the club does not exist.
    pub async fn create_event(
        &self,
        principal: &Principal,
        club_id: &ClubId,
        draft: EventDraft,
    ) -> Result<Event, StoreError> {
        let club: Club = codec::require(self.store.as_ref(), &paths::club(club_id)).await?;
        principal.ensure(principal.can_manage_club(&club), "create events for this club")?;
        validate_event(&draft)?;
        let mut event = Event::new(
            EventId::new(""),
            club_id.clone(),
            draft,
            principal.user_id.clone(),
            Utc::now(),
        );
        let id = self.store.add(&paths::events(club_id), encode(&event)?).await?;
        event.id = EventId::new(id);
        tracing::info!(club_id = %club_id, event_id = %event.id, "event created");
        Ok(event)
    }

    /// Applies a partial edit; the merged event must still validate.
    ///
    /// # Errors
    /// [`yotc_core::CoreError::Forbidden`] unless admin or club leader,
    /// [`yotc_core::CoreError::Validation`], [`StoreError::NotFound`].
    pub async fn update_event(
        &self,
        principal: &Principal,
        club_id: &ClubId,
        event_id: &EventId,
        update: EventUpdate,
    ) -> Result<Event, StoreError> {
        let club: Club = codec::require(self.store.as_ref(), &paths::club(club_id)).await?;
        principal.ensure(principal.can_manage_club(&club), "edit this club's events")?;
        let path = paths::event(club_id, event_id);
        let event: Event = codec::require(self.store.as_ref(), &path).await?;
        validate_event(&update.merged_with(&event))?;
        let mut patch = encode(&update)?;
        patch.insert("updatedAt".to_owned(), json!(Utc::now()));
        self.store.update(&path, patch).await?;
        tracing::info!(club_id = %club_id, event_id = %event_id, "event updated");
        codec::require(self.store.as_ref(), &path).await
    }

    /// Deletes an event. Its RSVPs and logs are left in place.
    ///
    /// # Errors
    /// [`yotc_core::CoreError::Forbidden`] unless admin or club leader.
    pub async fn delete_event(
        &self,
        principal: &Principal,
        club_id: &ClubId,
        event_id: &EventId,
    ) -> Result<(), StoreError> {
        let club: Club = codec::require(self.store.as_ref(), &paths::club(club_id)).await?;
        principal.ensure(principal.can_manage_club(&club), "delete this club's events")?;
        self.store.delete(&paths::event(club_id, event_id)).await?;
        tracing::info!(club_id = %club_id, event_id = %event_id, "event deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use yotc_core::{ClubSuggestion, UserId};

    use super::*;
    use crate::memory::MemoryStore;

    async fn seeded() -> (EventService, ClubId) {
        let store = Arc::new(MemoryStore::new());
        let mut club = Club::suggested(
            ClubId::new("c1"),
            ClubSuggestion::default(),
            UserId::new("u0"),
            Utc::now(),
        );
        club.is_active = true;
        club.leader_ids.push(UserId::new("leader"));
        let doc = match encode(&club) {
            Ok(d) => d,
            Err(e) => panic!("encode failed: {e}"),
        };
        assert!(store.set("clubs/c1", doc).await.is_ok());
        (EventService::new(store), club.id)
    }

    fn draft(name: &str, start_in_days: i64) -> EventDraft {
        let start = Utc::now() + Duration::days(start_in_days);
        EventDraft {
            name: name.to_owned(),
            description: "Portable operation in the park.".to_owned(),
            start_time: start,
            end_time: start + Duration::hours(4),
        }
    }

    #[tokio::test]
    async fn events_list_soonest_first() {
        let (svc, club) = seeded().await;
        let leader = Principal::user("leader");
        assert!(svc.create_event(&leader, &club, draft("Later", 10)).await.is_ok());
        assert!(svc.create_event(&leader, &club, draft("Sooner", 1)).await.is_ok());
        let names: Vec<String> = match svc.club_events(&club).await {
            Ok(events) => events.into_iter().map(|e| e.name).collect(),
            Err(e) => panic!("list failed: {e}"),
        };
        assert_eq!(names, vec!["Sooner", "Later"]);
        assert_eq!(svc.all_events().await.map(|e| e.len()).ok(), Some(2));
    }

    #[tokio::test]
    async fn members_cannot_create_events() {
        let (svc, club) = seeded().await;
        let result = svc.create_event(&Principal::user("member"), &club, draft("Nope", 1)).await;
        assert!(matches!(result, Err(StoreError::Core(yotc_core::CoreError::Forbidden { .. }))));
    }

    #[tokio::test]
    async fn update_rejects_end_before_start() {
        let (svc, club) = seeded().await;
        let leader = Principal::user("leader");
        let event = match svc.create_event(&leader, &club, draft("Field Day", 1)).await {
            Ok(e) => e,
            Err(e) => panic!("create failed: {e}"),
        };
        let update = EventUpdate {
            end_time: Some(event.start_time - Duration::hours(1)),
            ..EventUpdate::default()
        };
        let result = svc.update_event(&leader, &club, &event.id, update).await;
        assert!(matches!(result, Err(StoreError::Core(yotc_core::CoreError::Validation(_)))));

        let rename = EventUpdate { name: Some("Winter Field Day".to_owned()), ..EventUpdate::default() };
        let renamed = match svc.update_event(&leader, &club, &event.id, rename).await {
            Ok(e) => e,
            Err(e) => panic!("update failed: {e}"),
        };
        assert_eq!(renamed.name, "Winter Field Day");
        assert_eq!(renamed.start_time, event.start_time);
    }

    #[tokio::test]
    async fn deleted_event_is_gone() {
        let (svc, club) = seeded().await;
        let admin = Principal::admin("root");
        let event = match svc.create_event(&admin, &club, draft("Field Day", 1)).await {
            Ok(e) => e,
            Err(e) => panic!("create failed: {e}"),
        };
        assert!(svc.delete_event(&admin, &club, &event.id).await.is_ok());
        assert!(matches!(svc.get_event(&club, &event.id).await, Ok(None)));
    }
}
