//! Error types for the gateway crate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use yotc_core::CoreError;
use yotc_store::StoreError;

/// Errors that can occur during gateway request handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// A store operation failed; `action` names what the caller was doing.
    #[error("failed to {action}: {source}")]
    Store {
        action: &'static str,
        #[source]
        source: StoreError,
    },

    /// No caller identity was supplied.
    #[error("authentication required")]
    Unauthenticated,

    /// The request is malformed or contains invalid values.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A looked-up record does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The request body exceeds the configured upload limit.
    #[error("request body exceeds the upload limit")]
    PayloadTooLarge,
}

impl GatewayError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Store { source, .. } => match source {
                StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                StoreError::Conflict(_) => StatusCode::CONFLICT,
                StoreError::InvalidPath { .. } => StatusCode::BAD_REQUEST,
                StoreError::Core(CoreError::Validation(_)) => StatusCode::BAD_REQUEST,
                StoreError::Core(CoreError::InvalidTransition { .. }) => StatusCode::CONFLICT,
                StoreError::Core(CoreError::Forbidden { .. }) => StatusCode::FORBIDDEN,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Short text suitable for showing to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Store { action, source: StoreError::Core(CoreError::Forbidden { .. }) } => {
                format!("You are not allowed to {action}")
            }
            Self::Store { action, .. } => format!("Failed to {action}"),
            Self::Unauthenticated => "You must be logged in".to_owned(),
            Self::InvalidRequest(_) => "The request could not be understood".to_owned(),
            Self::NotFound(what) => format!("{} not found", capitalize(what)),
            Self::PayloadTooLarge => "The file is too large".to_owned(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let mut body = json!({
            "error": self.to_string(),
            "message": self.user_message(),
        });
        if let Self::Store { source: StoreError::Core(CoreError::Validation(fields)), .. } = &self {
            body["fields"] = json!(fields);
        }
        (status, Json(body)).into_response()
    }
}

/// Attaches the caller's intent to store errors.
pub trait ResultExt<T> {
    /// Wraps an error as [`GatewayError::Store`] for `action`
    /// (e.g. `"approve membership"`).
    ///
    /// # Errors
    /// Returns the wrapped error if `self` is `Err`.
    fn during(self, action: &'static str) -> Result<T, GatewayError>;
}

impl<T> ResultExt<T> for Result<T, StoreError> {
    fn during(self, action: &'static str) -> Result<T, GatewayError> {
        self.map_err(|source| GatewayError::Store { action, source })
    }
}
