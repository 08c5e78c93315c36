//! One handle over every service, sharing a document store and blob storage.

use std::sync::Arc;

use crate::backend::DocumentStore;
use crate::blob::{BlobStorage, LocalBlobStorage};
use crate::clubs::ClubService;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::events::EventService;
use crate::logs::EventLogService;
use crate::memberships::MembershipService;
use crate::memory::MemoryStore;
use crate::rsvps::RsvpService;
use crate::users::UserService;

/// Entry point to the club membership services.
///
/// Construct once and share behind an `Arc`; every service is safe to call
/// concurrently.
#[derive(Clone)]
pub struct Clubhouse {
    clubs: ClubService,
    memberships: MembershipService,
    events: EventService,
    rsvps: RsvpService,
    users: UserService,
    logs: EventLogService,
}

impl Clubhouse {
    /// Wire every service to the given backends.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStorage>) -> Self {
        Self {
            clubs: ClubService::new(Arc::clone(&store), Arc::clone(&blobs)),
            memberships: MembershipService::new(Arc::clone(&store)),
            events: EventService::new(Arc::clone(&store)),
            rsvps: RsvpService::new(Arc::clone(&store)),
            users: UserService::new(Arc::clone(&store)),
            logs: EventLogService::new(store, blobs),
        }
    }

    /// Open the local backends described by `config`.
    ///
    /// # Errors
    /// Propagates errors from [`MemoryStore::open`].
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let store = match &config.data_file {
            Some(path) => MemoryStore::open(path.clone()).await?,
            None => MemoryStore::new(),
        };
        let blobs = LocalBlobStorage::new(config.blob_root.clone(), config.public_blob_url.clone());
        Ok(Self::new(Arc::new(store), Arc::new(blobs)))
    }

    #[must_use]
    pub fn clubs(&self) -> &ClubService {
        &self.clubs
    }

    #[must_use]
    pub fn memberships(&self) -> &MembershipService {
        &self.memberships
    }

    #[must_use]
    pub fn events(&self) -> &EventService {
        &self.events
    }

    #[must_use]
    pub fn rsvps(&self) -> &RsvpService {
        &self.rsvps
    }

    #[must_use]
    pub fn users(&self) -> &UserService {
        &self.users
    }

    #[must_use]
    pub fn logs(&self) -> &EventLogService {
        &self.logs
    }
}
