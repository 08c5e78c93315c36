//! File storage for club logos and event logs.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use yotc_core::{ClubId, CoreError, EventId};

use crate::error::StoreError;

/// A stored file and where clients can fetch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub path: String,
    pub download_url: String,
}

/// Object storage abstraction.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store `bytes` at `path`, replacing any existing object.
    ///
    /// # Errors
    /// [`StoreError::InvalidPath`] for paths escaping the storage root,
    /// [`StoreError::Io`] on write failure.
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<StoredBlob, StoreError>;

    /// Remove the object at `path`. Removing a missing object succeeds.
    ///
    /// # Errors
    /// [`StoreError::Io`] on failure other than the object being absent.
    async fn delete(&self, path: &str) -> Result<(), StoreError>;
}

/// Stores blobs as files below a root directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStorage {
    /// Blobs are written below `root` and served from `public_base_url`.
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// The directory blobs are written to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StoreError::InvalidPath {
                path: path.to_owned(),
                reason: "blob path must be relative without '..'",
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<StoredBlob, StoreError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        tracing::debug!(path, size = bytes.len(), "blob stored");
        Ok(StoredBlob {
            path: path.to_owned(),
            download_url: format!("{}/{}", self.public_base_url, url_path(path)),
        })
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Bytes escaped in each segment of a download URL path.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encodes each `/`-separated segment of a blob path.
fn url_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Reduces an uploaded filename to its final component.
///
/// # Errors
/// [`CoreError::Validation`] if nothing usable remains.
pub fn sanitize_filename(filename: &str) -> Result<String, StoreError> {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(CoreError::invalid_field("filename", "is required").into());
    }
    Ok(name.to_owned())
}

/// `club-logos/{club}/{millis}-{filename}`
#[must_use]
pub fn club_logo_path(club: &ClubId, millis: i64, filename: &str) -> String {
    format!("club-logos/{club}/{millis}-{filename}")
}

/// `event-logs/{club}/{event}/{millis}-{filename}`
#[must_use]
pub fn event_log_path(club: &ClubId, event: &EventId, millis: i64, filename: &str) -> String {
    format!("event-logs/{club}/{event}/{millis}-{filename}")
}
