//! Event RSVPs, keyed by user ID under each event.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use yotc_core::{Club, ClubId, ClubMembership, Event, EventId, EventRsvp, Principal, User, UserId};

use crate::backend::DocumentStore;
use crate::codec::{self, decode_all, encode};
use crate::error::StoreError;
use crate::paths;
use crate::query::Query;

/// An event the user has RSVP'd to, with its hosting club.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RsvpedEvent {
    pub event: Event,
    pub club: Club,
}

/// One line of an event's attendee list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub user_id: UserId,
    /// `"{name} ({callsign})"`, or the user ID when no profile exists.
    pub display_name: String,
}

#[derive(Clone)]
pub struct RsvpService {
    store: Arc<dyn DocumentStore>,
}

impl RsvpService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// # Errors
    /// Store failures.
    pub async fn event_rsvps(
        &self,
        club_id: &ClubId,
        event_id: &EventId,
    ) -> Result<Vec<EventRsvp>, StoreError> {
        let q = Query::collection(paths::rsvps(club_id, event_id));
        Ok(decode_all(self.store.query(&q).await?))
    }

    /// The user's RSVP, if any. Lookup failures are logged and reported as
    /// no RSVP.
    pub async fn user_rsvp(&self, club_id: &ClubId, event_id: &EventId, user: &UserId) -> Option<EventRsvp> {
        match codec::load(self.store.as_ref(), &paths::rsvp(club_id, event_id, user)).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(club_id = %club_id, event_id = %event_id, user_id = %user, error = %e, "rsvp lookup failed");
                None
            }
        }
    }

    /// RSVPs the caller to an event. Only active members of the hosting
    /// club may RSVP. Repeating an RSVP refreshes it.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the event does not exist,
    /// [`yotc_core::CoreError::Forbidden`] for non-members.
    pub async fn create_rsvp(
        &self,
        principal: &Principal,
        club_id: &ClubId,
        event_id: &EventId,
    ) -> Result<EventRsvp, StoreError> {
        let _: Event = codec::require(self.store.as_ref(), &paths::event(club_id, event_id)).await?;
        let membership: Option<ClubMembership> =
            codec::load(self.store.as_ref(), &paths::membership(club_id, &principal.user_id)).await?;
        principal.ensure(membership.is_some_and(|m| m.is_active()), "RSVP to this club's events")?;

        let rsvp = EventRsvp::new(club_id.clone(), event_id.clone(), principal.user_id.clone(), Utc::now());
        self.store
            .set(&paths::rsvp(club_id, event_id, &principal.user_id), encode(&rsvp)?)
            .await?;
        tracing::info!(club_id = %club_id, event_id = %event_id, user_id = %principal.user_id, "rsvp created");
        Ok(rsvp)
    }

    /// Withdraws the caller's RSVP. Withdrawing twice succeeds.
    ///
    /// # Errors
    /// Store failures.
    pub async fn delete_rsvp(
        &self,
        principal: &Principal,
        club_id: &ClubId,
        event_id: &EventId,
    ) -> Result<(), StoreError> {
        self.store
            .delete(&paths::rsvp(club_id, event_id, &principal.user_id))
            .await?;
        tracing::info!(club_id = %club_id, event_id = %event_id, user_id = %principal.user_id, "rsvp withdrawn");
        Ok(())
    }

    /// Flips the caller's RSVP and returns whether they are now attending.
    ///
    /// # Errors
    /// As [`Self::create_rsvp`] and [`Self::delete_rsvp`].
    pub async fn toggle_rsvp(
        &self,
        principal: &Principal,
        club_id: &ClubId,
        event_id: &EventId,
    ) -> Result<bool, StoreError> {
        if self.user_rsvp(club_id, event_id, &principal.user_id).await.is_some() {
            self.delete_rsvp(principal, club_id, event_id).await?;
            Ok(false)
        } else {
            self.create_rsvp(principal, club_id, event_id).await?;
            Ok(true)
        }
    }

    /// Events the user has RSVP'd to, soonest first. RSVPs whose event or
    /// club no longer exists are skipped.
    ///
    /// # Errors
    /// Store failures on the RSVP query.
    pub async fn rsvped_events(&self, user: &UserId) -> Result<Vec<RsvpedEvent>, StoreError> {
        let q = Query::group(paths::RSVPS).where_eq("userId", user.as_str());
        let rsvps: Vec<EventRsvp> = decode_all(self.store.query(&q).await?);

        let mut found = Vec::with_capacity(rsvps.len());
        for rsvp in rsvps {
            let event_path = paths::event(&rsvp.club_id, &rsvp.event_id);
            let club_path = paths::club(&rsvp.club_id);
            let event = codec::load::<Event>(self.store.as_ref(), &event_path).await;
            let club = codec::load::<Club>(self.store.as_ref(), &club_path).await;
            match (event, club) {
                (Ok(Some(event)), Ok(Some(club))) => found.push(RsvpedEvent { event, club }),
                (Err(e), _) | (_, Err(e)) => {
                    tracing::warn!(event_id = %rsvp.event_id, error = %e, "skipping unreadable rsvp target");
                }
                _ => {}
            }
        }
        found.sort_by_key(|r| r.event.start_time);
        Ok(found)
    }

    /// Everyone who has RSVP'd, labelled for display.
    ///
    /// # Errors
    /// Store failures on the RSVP query.
    pub async fn attendees(&self, club_id: &ClubId, event_id: &EventId) -> Result<Vec<Attendee>, StoreError> {
        let rsvps = self.event_rsvps(club_id, event_id).await?;
        let mut attendees = Vec::with_capacity(rsvps.len());
        for rsvp in rsvps {
            let user = match codec::load::<User>(self.store.as_ref(), &paths::user(&rsvp.user_id)).await {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!(user_id = %rsvp.user_id, error = %e, "attendee lookup failed");
                    None
                }
            };
            let display_name = user.map_or_else(|| rsvp.user_id.to_string(), |u| u.display_name());
            attendees.push(Attendee { user_id: rsvp.user_id, display_name });
        }
        Ok(attendees)
    }
}
