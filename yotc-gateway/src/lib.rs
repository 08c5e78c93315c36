//! HTTP API gateway for the Year Of The Club membership service.
//!
//! Serves clubs, memberships, events, RSVPs and contest logs over JSON,
//! with caller identity taken from headers set by the identity provider.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
