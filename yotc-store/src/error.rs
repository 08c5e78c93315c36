//! Error types for the store crate.

use yotc_core::CoreError;

/// Errors that can occur while reading or writing documents and blobs.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// No document exists at the given path.
    #[error("document not found: {path}")]
    NotFound { path: String },

    /// The write would clash with existing data.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A document or collection path is malformed.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// A stored document could not be decoded, or a record could not be encoded.
    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A domain rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Underlying I/O error (snapshot file or blob storage).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }
}
