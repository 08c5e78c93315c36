//! Where the store keeps its data.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Storage locations for a [`crate::Clubhouse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct StoreConfig {
    /// Snapshot file for documents. `None` keeps everything in memory.
    pub data_file: Option<PathBuf>,

    /// Directory uploaded files are written to.
    pub blob_root: PathBuf,

    /// URL prefix under which `blob_root` is served.
    pub public_blob_url: String,
}

impl StoreConfig {
    /// In-memory documents with blobs under `blob_root`.
    #[must_use]
    pub fn new(blob_root: PathBuf, public_blob_url: impl Into<String>) -> Self {
        Self { data_file: None, blob_root, public_blob_url: public_blob_url.into() }
    }

    /// Persist documents to `path`.
    #[must_use]
    pub fn with_data_file(mut self, path: PathBuf) -> Self {
        self.data_file = Some(path);
        self
    }
}
