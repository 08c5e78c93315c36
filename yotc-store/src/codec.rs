//! Conversion between domain records and stored documents.
//!
//! Records carry their own `id`; stored bodies do not, because the ID is
//! the last segment of the document path.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::backend::{Document, DocumentStore, Snapshot};
use crate::error::StoreError;
use crate::paths;

/// Serializes a record into a document body, dropping its `id`.
///
/// # Errors
/// [`StoreError::Serialization`] if the record does not serialize to an object.
pub fn encode<T: Serialize>(record: &T) -> Result<Document, StoreError> {
    let mut doc = into_document(serde_json::to_value(record)?)?;
    doc.remove("id");
    Ok(doc)
}

/// Converts a JSON object (e.g. from `json!`) into a document body.
///
/// # Errors
/// [`StoreError::Serialization`] if `value` is not an object.
pub fn into_document(value: Value) -> Result<Document, StoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(serde::de::Error::custom(format!(
            "expected a JSON object, got {other}"
        )))),
    }
}

/// Decodes a stored body into a record, restoring its `id`.
///
/// # Errors
/// [`StoreError::Serialization`] if the body does not match the record shape.
pub fn decode<T: DeserializeOwned>(id: &str, mut data: Document) -> Result<T, StoreError> {
    data.insert("id".to_owned(), Value::String(id.to_owned()));
    Ok(serde_json::from_value(Value::Object(data))?)
}

/// Decodes every snapshot, skipping (and logging) documents that do not
/// match the record shape.
pub fn decode_all<T: DeserializeOwned>(snapshots: Vec<Snapshot>) -> Vec<T> {
    snapshots
        .into_iter()
        .filter_map(|snap| match decode(&snap.id, snap.data) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(path = %snap.path, error = %e, "skipping malformed document");
                None
            }
        })
        .collect()
}

/// Reads and decodes the record at `path`, if present.
pub(crate) async fn load<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    path: &str,
) -> Result<Option<T>, StoreError> {
    let Some(data) = store.get(path).await? else {
        return Ok(None);
    };
    let id = paths::split_document_path(path).map_or(path, |(_, id)| id);
    decode(id, data).map(Some)
}

/// Like [`load`], but a missing document is [`StoreError::NotFound`].
pub(crate) async fn require<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    path: &str,
) -> Result<T, StoreError> {
    load(store, path).await?.ok_or_else(|| StoreError::not_found(path))
}
