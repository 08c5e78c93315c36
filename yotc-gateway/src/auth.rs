//! Caller identity from headers set by the identity provider in front of
//! the gateway.
//!
//! `X-User-Id` carries the authenticated user's ID. `X-User-Claims` is a
//! comma-separated claim list; the `admin` claim grants admin rights.

use axum::{extract::FromRequestParts, http::request::Parts};
use yotc_core::Principal;

use crate::error::GatewayError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const CLAIMS_HEADER: &str = "x-user-claims";

const ADMIN_CLAIM: &str = "admin";

/// The authenticated caller. Rejects with 401 when no identity is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(GatewayError::Unauthenticated)?;
        if user_id.contains('/') {
            return Err(GatewayError::InvalidRequest("user id must not contain '/'".to_owned()));
        }
        let is_admin = parts
            .headers
            .get(CLAIMS_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(has_admin_claim);
        let principal = if is_admin { Principal::admin(user_id) } else { Principal::user(user_id) };
        Ok(Self(principal))
    }
}

fn has_admin_claim(claims: &str) -> bool {
    claims.split(',').any(|c| c.trim().eq_ignore_ascii_case(ADMIN_CLAIM))
}
