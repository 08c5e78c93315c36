//! Persistence and data-access services for Year Of The Club.
//!
//! Records live in a hierarchical [`DocumentStore`]; uploaded files live in
//! [`BlobStorage`]. The services enforce permissions and the membership
//! state machine on top of both, and [`Clubhouse`] bundles them.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod backend;
pub mod blob;
pub mod clubhouse;
pub mod clubs;
pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod logs;
pub mod memberships;
pub mod memory;
pub mod paths;
pub mod query;
pub mod rsvps;
pub mod users;

pub use backend::{Document, DocumentStore, Snapshot};
pub use blob::{BlobStorage, LocalBlobStorage, StoredBlob};
pub use clubhouse::Clubhouse;
pub use clubs::ClubService;
pub use config::StoreConfig;
pub use error::StoreError;
pub use events::EventService;
pub use logs::EventLogService;
pub use memberships::{MembershipService, RosterEntry};
pub use memory::MemoryStore;
pub use query::{Direction, Query, Scope};
pub use rsvps::{Attendee, RsvpService, RsvpedEvent};
pub use users::UserService;
