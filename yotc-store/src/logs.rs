//! Contest logs uploaded by event attendees.

use std::sync::Arc;

use chrono::Utc;
use yotc_core::{Club, ClubId, CoreError, Event, EventId, EventLog, EventRsvp, LogId, Principal};

use crate::backend::DocumentStore;
use crate::blob::{event_log_path, sanitize_filename, BlobStorage};
use crate::codec::{self, decode_all, encode};
use crate::error::StoreError;
use crate::paths;
use crate::query::{Direction, Query};

#[derive(Clone)]
pub struct EventLogService {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStorage>,
}

impl EventLogService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStorage>) -> Self {
        Self { store, blobs }
    }

    /// Logs uploaded for an event, newest first.
    ///
    /// # Errors
    /// Store failures.
    pub async fn event_logs(&self, club_id: &ClubId, event_id: &EventId) -> Result<Vec<EventLog>, StoreError> {
        let q = Query::collection(paths::event_logs(club_id, event_id))
            .order_by("uploadedAt", Direction::Descending);
        Ok(decode_all(self.store.query(&q).await?))
    }

    /// Stores the file, then records it against the event.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the event does not exist,
    /// [`CoreError::Forbidden`] unless the caller RSVP'd,
    /// [`CoreError::Validation`] for empty files or unusable names.
    pub async fn upload_log(
        &self,
        principal: &Principal,
        club_id: &ClubId,
        event_id: &EventId,
        filename: &str,
        bytes: &[u8],
    ) -> Result<EventLog, StoreError> {
        let _: Event = codec::require(self.store.as_ref(), &paths::event(club_id, event_id)).await?;
        let rsvp: Option<EventRsvp> =
            codec::load(self.store.as_ref(), &paths::rsvp(club_id, event_id, &principal.user_id)).await?;
        principal.ensure(rsvp.is_some(), "upload logs for an event they did not RSVP to")?;
        let filename = sanitize_filename(filename)?;
        if bytes.is_empty() {
            return Err(CoreError::invalid_field("file", "is empty").into());
        }

        let now = Utc::now();
        let blob = self
            .blobs
            .put(&event_log_path(club_id, event_id, now.timestamp_millis(), &filename), bytes)
            .await?;
        let mut log = EventLog::new(
            LogId::new(""),
            club_id.clone(),
            event_id.clone(),
            principal.user_id.clone(),
            blob.path,
            blob.download_url,
            filename,
            now,
        );
        let id = self.store.add(&paths::event_logs(club_id, event_id), encode(&log)?).await?;
        log.id = LogId::new(id);
        tracing::info!(club_id = %club_id, event_id = %event_id, log_id = %log.id, size = bytes.len(), "event log uploaded");
        Ok(log)
    }

    /// Removes the record, then the stored file.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the log does not exist,
    /// [`CoreError::Forbidden`] unless uploader, club leader or admin.
    pub async fn delete_log(
        &self,
        principal: &Principal,
        club_id: &ClubId,
        event_id: &EventId,
        log_id: &LogId,
    ) -> Result<(), StoreError> {
        let path = paths::event_log(club_id, event_id, log_id);
        let log: EventLog = codec::require(self.store.as_ref(), &path).await?;
        let mut allowed = log.uploaded_by == principal.user_id || principal.is_admin;
        if !allowed {
            let club: Option<Club> = codec::load(self.store.as_ref(), &paths::club(club_id)).await?;
            allowed = club.is_some_and(|c| c.is_leader(&principal.user_id));
        }
        principal.ensure(allowed, "delete this log")?;
        self.store.delete(&path).await?;
        self.blobs.delete(&log.storage_path).await?;
        tracing::info!(club_id = %club_id, event_id = %event_id, log_id = %log_id, "event log deleted");
        Ok(())
    }
}
