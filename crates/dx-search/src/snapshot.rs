//! Snapshot persistence.
//!
//! A snapshot is a JSON document `{"version": 1, "documents": [...]}` holding
//! every indexed [`SearchDocument`]. Loading never fails the caller: a
//! missing, unreadable or malformed snapshot degrades to an empty index.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document::SearchDocument;
use crate::index::{SearchConfig, SearchIndex};

/// Snapshot format version written by [`SearchIndex::persist`].
pub const SNAPSHOT_VERSION: u32 = 1;

/// Durable storage for a serialized index.
pub trait SnapshotStore: Send + Sync {
    /// Replace the stored snapshot.
    fn write_snapshot(&self, bytes: &[u8]) -> io::Result<()>;

    /// Read the stored snapshot, `None` if nothing was stored yet.
    fn read_snapshot(&self) -> io::Result<Option<Vec<u8>>>;
}

/// Snapshot stored in a single file.
///
/// Writes go to a sibling temporary file that is renamed into place, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Clone, Debug)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn write_snapshot(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)
    }

    fn read_snapshot(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Failure to restore an index from a snapshot.
///
/// Never fatal: [`SearchIndex::load`] logs it and continues with an empty
/// index.
#[derive(Debug, thiserror::Error)]
pub enum IndexLoadError {
    #[error("No search snapshot stored")]
    Missing,
    #[error("Failed to read search snapshot: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed search snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(
        "Unsupported search snapshot version {found} (expected {expected})",
        expected = SNAPSHOT_VERSION
    )]
    UnsupportedVersion { found: u32 },
}

/// Failure to write a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Failed to serialize search snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write search snapshot: {0}")]
    Io(#[from] io::Error),
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    documents: &'a [SearchDocument],
}

#[derive(Deserialize)]
struct SnapshotHeader {
    version: u32,
}

#[derive(Deserialize)]
struct Snapshot {
    documents: Vec<SearchDocument>,
}

impl SearchIndex {
    /// Serialize all documents to `store`.
    pub fn persist(&self, store: &dyn SnapshotStore) -> Result<(), PersistError> {
        let bytes = serde_json::to_vec(&SnapshotRef {
            version: SNAPSHOT_VERSION,
            documents: self.documents(),
        })?;
        store.write_snapshot(&bytes)?;
        tracing::debug!(document_count = self.len(), "Persisted search snapshot");
        Ok(())
    }

    /// Restore an index from `store`.
    pub fn try_load(
        store: &dyn SnapshotStore,
        config: SearchConfig,
    ) -> Result<Self, IndexLoadError> {
        let bytes = store.read_snapshot()?.ok_or(IndexLoadError::Missing)?;
        let header: SnapshotHeader = serde_json::from_slice(&bytes)?;
        if header.version != SNAPSHOT_VERSION {
            return Err(IndexLoadError::UnsupportedVersion {
                found: header.version,
            });
        }
        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
        Ok(Self::build(snapshot.documents, config))
    }

    /// Restore an index from `store`, or an empty index if that fails.
    #[must_use]
    pub fn load(store: &dyn SnapshotStore, config: SearchConfig) -> Self {
        match Self::try_load(store, config) {
            Ok(index) => {
                tracing::debug!(document_count = index.len(), "Loaded search snapshot");
                index
            }
            Err(IndexLoadError::Missing) => {
                tracing::debug!("No search snapshot, starting empty");
                Self::empty(config)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring search snapshot");
                Self::empty(config)
            }
        }
    }
}
