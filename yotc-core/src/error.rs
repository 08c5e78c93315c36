use std::fmt;

use serde::Serialize;

use crate::id::UserId;
use crate::membership::{MembershipAction, MembershipRole, MembershipStatus};

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Wire name of the offending field (e.g. `"callsign"`).
    pub field: &'static str,
    /// Human-readable reason the value was rejected.
    pub reason: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Errors produced by the `yotc-core` crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// One or more input fields failed validation.
    #[error("validation failed: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    /// The requested membership action is not allowed from the current state.
    #[error("cannot {action} a membership that is {status} ({role})")]
    InvalidTransition {
        status: MembershipStatus,
        role: MembershipRole,
        action: MembershipAction,
    },

    /// The acting user lacks the rights for this operation.
    #[error("user {user_id} is not allowed to {action}")]
    Forbidden { user_id: UserId, action: &'static str },
}

impl CoreError {
    /// Builds a validation error for a single field.
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation(vec![FieldViolation { field, reason: reason.into() }])
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
