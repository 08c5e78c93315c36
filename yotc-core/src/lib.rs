//! Core types for the Year Of The Club membership service.
//!
//! Defines the domain records (clubs, memberships, events, RSVPs, logs,
//! users), the membership state machine, permission predicates, and the
//! validation rules applied to user input.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod club;
pub mod error;
pub mod event;
pub mod id;
pub mod membership;
pub mod permission;
pub mod slug;
pub mod timestamp;
pub mod user;
pub mod validate;

pub use club::{Club, ClubSuggestion, ClubUpdate};
pub use error::{CoreError, FieldViolation};
pub use event::{Event, EventDraft, EventLog, EventRsvp, EventUpdate};
pub use id::{ClubId, EventId, LogId, UserId};
pub use membership::{ClubMembership, MembershipAction, MembershipRole, MembershipStatus};
pub use permission::Principal;
pub use user::{User, UserProfile};
