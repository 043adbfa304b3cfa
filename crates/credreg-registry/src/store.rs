//! # Snapshot Persistence
//!
//! Stores a [`LedgerSnapshot`] as pretty JSON. Writes go to a sibling
//! temporary file that is then renamed over the target, so a crash never
//! leaves a half-written snapshot. A snapshot older than the last one
//! written through the same store is skipped; concurrent writers may race
//! to persist, but the newest state always wins.
//!
//! Loading rebuilds the directory's reverse identity index (through the
//! directory's serde impl) and rejects a snapshot whose audit chain does not
//! verify.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;

use crate::ledger::LedgerSnapshot;

/// Errors from snapshot persistence.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("snapshot I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid snapshot.
    #[error("snapshot {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serialization of the in-memory snapshot failed.
    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The audit chain in the file does not verify.
    #[error("snapshot {path} has a broken audit chain ({broken_links} broken links)")]
    BrokenChain { path: PathBuf, broken_links: usize },

    /// Refused to overwrite an existing snapshot.
    #[error("snapshot {0} already exists")]
    AlreadyExists(PathBuf),
}

/// A snapshot file on disk.
#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
    // Sequence of the last snapshot written; also serializes writers.
    last_written: Mutex<Option<u64>>,
}

impl SnapshotStore {
    /// A store at `path`. Nothing is read or written yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_written: Mutex::new(None),
        }
    }

    /// The snapshot path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a snapshot file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the snapshot, or `None` when the file does not exist.
    pub fn load(&self) -> Result<Option<LedgerSnapshot>, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let snapshot: LedgerSnapshot =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        let integrity = snapshot.journal.verify_chain();
        if !integrity.chain_valid {
            return Err(StoreError::BrokenChain {
                path: self.path.clone(),
                broken_links: integrity.broken_links,
            });
        }

        *self.last_written.lock() = Some(snapshot.sequence());
        tracing::debug!(path = %self.path.display(), sequence = snapshot.sequence(), "snapshot loaded");
        Ok(Some(snapshot))
    }

    /// Write `snapshot`, replacing the file. Returns `false` when skipped
    /// because a newer snapshot was already written.
    pub fn save(&self, snapshot: &LedgerSnapshot) -> Result<bool, StoreError> {
        let mut last = self.last_written.lock();
        let sequence = snapshot.sequence();
        if matches!(*last, Some(prev) if prev > sequence) {
            tracing::debug!(sequence, "skipping stale snapshot");
            return Ok(false);
        }

        let json = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.tmp_path();
        std::fs::write(&tmp, &json).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        *last = Some(sequence);
        tracing::debug!(path = %self.path.display(), sequence, "snapshot written");
        Ok(true)
    }

    /// Write `snapshot` only if no file exists yet.
    pub fn create(&self, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        if self.exists() {
            return Err(StoreError::AlreadyExists(self.path.clone()));
        }
        self.save(snapshot).map(|_| ())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
