//! Document store abstraction trait.
//!
//! Models a hierarchical document database: documents live at
//! slash-separated paths alternating collection and document segments.
//! Writes to a single document are atomic; nothing spans documents.

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::StoreError;
use crate::paths;
use crate::query::Query;

/// The body of a stored document. The document ID is not part of the body.
pub type Document = Map<String, Value>;

/// A document returned from a query, with its location.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Final path segment.
    pub id: String,
    /// Full document path.
    pub path: String,
    pub data: Document,
}

/// Hierarchical document database.
///
/// Implementations must be `Send + Sync` to allow sharing across request
/// handlers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document.
    ///
    /// # Errors
    /// [`StoreError::InvalidPath`] if `path` is not a document path.
    async fn get(&self, path: &str) -> Result<Option<Document>, StoreError>;

    /// Create or overwrite a document.
    ///
    /// # Errors
    /// [`StoreError::InvalidPath`] if `path` is not a document path.
    async fn set(&self, path: &str, doc: Document) -> Result<(), StoreError>;

    /// Merge top-level fields of `patch` into an existing document.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if no document exists at `path`.
    async fn update(&self, path: &str, patch: Document) -> Result<(), StoreError>;

    /// Delete a document. Deleting a missing document succeeds. Documents in
    /// nested collections are left in place.
    ///
    /// # Errors
    /// [`StoreError::InvalidPath`] if `path` is not a document path.
    async fn delete(&self, path: &str) -> Result<(), StoreError>;

    /// Run a query and return matching documents.
    ///
    /// # Errors
    /// Backend-specific I/O failures.
    async fn query(&self, query: &Query) -> Result<Vec<Snapshot>, StoreError>;

    /// Create a document with a generated ID in `collection`.
    ///
    /// # Errors
    /// [`StoreError::InvalidPath`] if `collection` is not a collection path.
    async fn add(&self, collection: &str, doc: Document) -> Result<String, StoreError> {
        paths::ensure_collection_path(collection)?;
        let id = Uuid::new_v4().simple().to_string();
        self.set(&format!("{collection}/{id}"), doc).await?;
        Ok(id)
    }
}
