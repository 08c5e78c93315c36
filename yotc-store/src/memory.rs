//! In-process document store, optionally persisted to a JSON snapshot file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::backend::{Document, DocumentStore, Snapshot};
use crate::error::StoreError;
use crate::paths;
use crate::query::Query;

/// Documents keyed by full path.
type Tree = BTreeMap<String, Document>;

/// Thread-safe document store held in memory.
///
/// When opened with a snapshot file, the whole tree is rewritten to that
/// file after every successful write (write to a temporary sibling, then
/// rename), and reloaded on the next [`MemoryStore::open`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<Tree>,
    snapshot: Option<PathBuf>,
}

impl MemoryStore {
    /// Create an empty, purely in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store backed by the snapshot file at `path`, loading its
    /// contents if the file exists.
    ///
    /// # Errors
    /// [`StoreError::Io`] if the file cannot be read, or
    /// [`StoreError::Serialization`] if it is not a valid snapshot.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let docs = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Tree>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Tree::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(path = %path.display(), documents = docs.len(), "document store opened");
        Ok(Self { docs: RwLock::new(docs), snapshot: Some(path) })
    }

    /// Number of documents currently stored.
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    /// Returns `true` if the store holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }

    /// Applies `change` under the write lock. With a snapshot file the change
    /// is made to a copy that replaces the tree only once it is on disk.
    /// `change` returns whether anything changed.
    async fn write_with(
        &self,
        change: impl FnOnce(&mut Tree) -> Result<bool, StoreError> + Send,
    ) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        if self.snapshot.is_none() {
            return change(&mut docs).map(|_| ());
        }
        let mut next = docs.clone();
        if change(&mut next)? {
            self.persist(&next).await?;
            *docs = next;
        }
        Ok(())
    }

    async fn persist(&self, docs: &Tree) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        let bytes = serde_json::to_vec(docs)?;
        let tmp = temp_sibling(path);
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Document>, StoreError> {
        paths::ensure_document_path(path)?;
        Ok(self.docs.read().await.get(path).cloned())
    }

    async fn set(&self, path: &str, doc: Document) -> Result<(), StoreError> {
        paths::ensure_document_path(path)?;
        self.write_with(|docs| {
            docs.insert(path.to_owned(), doc);
            Ok(true)
        })
        .await
    }

    async fn update(&self, path: &str, patch: Document) -> Result<(), StoreError> {
        paths::ensure_document_path(path)?;
        self.write_with(|docs| {
            let doc = docs.get_mut(path).ok_or_else(|| StoreError::not_found(path))?;
            doc.extend(patch);
            Ok(true)
        })
        .await
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        paths::ensure_document_path(path)?;
        self.write_with(|docs| Ok(docs.remove(path).is_some())).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Snapshot>, StoreError> {
        let docs = self.docs.read().await;
        let mut rows: Vec<(&str, Document)> = docs
            .iter()
            .filter(|(path, doc)| query.in_scope(path) && query.matches(doc))
            .map(|(path, doc)| (path.as_str(), doc.clone()))
            .collect();
        query.sort(&mut rows);
        Ok(rows
            .into_iter()
            .map(|(path, data)| Snapshot {
                id: paths::split_document_path(path)
                    .map_or(path, |(_, id)| id)
                    .to_owned(),
                path: path.to_owned(),
                data,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::query::Direction;

    fn doc(v: Value) -> Document {
        match v {
            Value::Object(m) => m,
            other => panic!("expected object, got {other}"),
        }
    }

    #[tokio::test]
    async fn set_get_delete_lifecycle() {
        let store = MemoryStore::new();
        assert!(store.set("clubs/c1", doc(json!({"name": "DRC"}))).await.is_ok());
        let got = match store.get("clubs/c1").await {
            Ok(Some(d)) => d,
            other => panic!("expected document, got {other:?}"),
        };
        assert_eq!(got["name"], "DRC");
        assert!(store.delete("clubs/c1").await.is_ok());
        assert!(matches!(store.get("clubs/c1").await, Ok(None)));
        assert!(store.delete("clubs/c1").await.is_ok(), "deleting twice must succeed");
    }

    #[tokio::test]
    async fn update_missing_document_is_not_found() {
        let store = MemoryStore::new();
        let result = store.update("clubs/nope", doc(json!({"isActive": true}))).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn update_merges_top_level_fields() {
        let store = MemoryStore::new();
        assert!(store.set("users/u1", doc(json!({"name": "A", "isAdmin": true}))).await.is_ok());
        assert!(store.update("users/u1", doc(json!({"name": "B"}))).await.is_ok());
        let got = match store.get("users/u1").await {
            Ok(Some(d)) => d,
            other => panic!("expected document, got {other:?}"),
        };
        assert_eq!(got["name"], "B");
        assert_eq!(got["isAdmin"], true);
    }

    #[tokio::test]
    async fn collection_paths_are_rejected_for_documents() {
        let store = MemoryStore::new();
        let result = store.set("clubs", Document::new()).await;
        assert!(matches!(result, Err(StoreError::InvalidPath { .. })));
    }

    #[tokio::test]
    async fn add_generates_distinct_ids() {
        let store = MemoryStore::new();
        let a = store.add("clubs/c1/events", Document::new()).await;
        let b = store.add("clubs/c1/events", Document::new()).await;
        match (a, b) {
            (Ok(a), Ok(b)) => assert_ne!(a, b),
            other => panic!("add failed: {other:?}"),
        }
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn group_query_filters_and_orders() {
        let store = MemoryStore::new();
        for (path, status, applied) in [
            ("clubs/c1/memberships/u1", "active", "2025-01-02T00:00:00Z"),
            ("clubs/c2/memberships/u1", "pending", "2025-01-01T00:00:00Z"),
            ("clubs/c2/memberships/u2", "pending", "2025-01-03T00:00:00Z"),
        ] {
            let user = path.rsplit('/').next().unwrap_or_default();
            let body = doc(json!({"userId": user, "status": status, "appliedAt": applied}));
            assert!(store.set(path, body).await.is_ok());
        }
        let q = Query::group("memberships")
            .where_eq("userId", "u1")
            .order_by("appliedAt", Direction::Ascending);
        let rows = match store.query(&q).await {
            Ok(r) => r,
            Err(e) => panic!("query failed: {e}"),
        };
        let paths: Vec<&str> = rows.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["clubs/c2/memberships/u1", "clubs/c1/memberships/u1"]);
        assert!(rows.iter().all(|s| s.id == "u1"));
    }

    #[tokio::test]
    async fn snapshot_file_survives_reopen() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir failed: {e}"),
        };
        let file = dir.path().join("store.json");
        {
            let store = match MemoryStore::open(&file).await {
                Ok(s) => s,
                Err(e) => panic!("open failed: {e}"),
            };
            assert!(store.set("clubs/c1", doc(json!({"name": "DRC"}))).await.is_ok());
        }
        let reopened = match MemoryStore::open(&file).await {
            Ok(s) => s,
            Err(e) => panic!("reopen failed: {e}"),
        };
        assert!(matches!(reopened.get("clubs/c1").await, Ok(Some(_))));
        assert!(!file.with_file_name("store.json.tmp").exists(), "temp file must be renamed away");
    }

    #[tokio::test]
    async fn failed_snapshot_write_leaves_tree_unchanged() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir failed: {e}"),
        };
        let data_dir = dir.path().join("data");
        assert!(std::fs::create_dir(&data_dir).is_ok());
        let store = match MemoryStore::open(data_dir.join("store.json")).await {
            Ok(s) => s,
            Err(e) => panic!("open failed: {e}"),
        };
        assert!(store.set("clubs/c1", doc(json!({"name": "DRC"}))).await.is_ok());
        assert!(std::fs::remove_dir_all(&data_dir).is_ok());

        assert!(matches!(store.set("clubs/c2", doc(json!({"name": "RMRL"}))).await, Err(StoreError::Io(_))));
        assert!(store.update("clubs/c1", doc(json!({"name": "Changed"}))).await.is_err());
        assert!(store.delete("clubs/c1").await.is_err());

        assert_eq!(store.len().await, 1);
        let kept = match store.get("clubs/c1").await {
            Ok(Some(d)) => d,
            other => panic!("expected document, got {other:?}"),
        };
        assert_eq!(kept["name"], "DRC");
        assert!(store.delete("clubs/missing").await.is_ok(), "no-op deletes never touch the file");
    }
}
