//! Storage abstraction for the history document.
//!
//! The [`HistoryStore`] trait is deliberately whole-document: `load` returns
//! everything, `save` replaces everything. Backends may change the medium
//! (JSON file, in-memory map, embedded key-value store) but must keep those
//! semantics. Stores do no locking of their own; callers that need ordered
//! writes serialize them.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::models::HistoryDocument;

/// Failures surfaced by a [`HistoryStore`].
///
/// A missing backing record is not an error: `load` returns an empty
/// document in that case. A record that exists but cannot be read or
/// parsed is always an error and is never replaced with empty data.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing record exists but could not be read.
    #[error("failed to read history from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing record exists but is not a valid history document.
    #[error("history record at {path} is not a valid document: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The document could not be encoded for storage.
    #[error("failed to serialize history: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The backing medium rejected the write.
    #[error("failed to write history to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// True for failures on the load path.
    pub fn is_read(&self) -> bool {
        matches!(self, StoreError::Read { .. } | StoreError::Parse { .. })
    }

    /// True for failures on the save path.
    pub fn is_write(&self) -> bool {
        matches!(self, StoreError::Serialize(_) | StoreError::Write { .. })
    }
}

/// Whole-document persistence for history entries.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`load`](HistoryStore::load) | Read the full document (empty if none stored yet) |
/// | [`save`](HistoryStore::save) | Overwrite the full document |
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Return the currently persisted document.
    async fn load(&self) -> Result<HistoryDocument, StoreError>;

    /// Replace the persisted document with `doc`.
    async fn save(&self, doc: &HistoryDocument) -> Result<(), StoreError>;
}
