//! JSON file [`HistoryStore`] backend.
//!
//! The whole history document lives in one pretty-printed JSON file. Every
//! `load` reads and parses the file, every `save` rewrites it. There is no
//! cache.
//!
//! Writes go to a sibling `<name>.tmp` file which is then renamed over the
//! target, so an interrupted write leaves the previous document intact.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use greenblog_core::models::HistoryDocument;
use greenblog_core::store::{HistoryStore, StoreError};

/// History store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the data directory and an empty document if nothing is stored.
    ///
    /// Returns `true` when a new file was written. An existing record is
    /// left untouched, even if it is not valid JSON.
    pub async fn init(&self) -> Result<bool, StoreError> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })?;
        if exists {
            return Ok(false);
        }
        self.save(&HistoryDocument::new()).await?;
        Ok(true)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("history.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl HistoryStore for JsonFileStore {
    async fn load(&self) -> Result<HistoryDocument, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no history record yet");
                return Ok(HistoryDocument::new());
            }
            Err(source) => {
                tracing::warn!(path = %self.path.display(), error = %source, "history read failed");
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        // A literal `null` document counts as empty; anything else must parse.
        let doc: Option<HistoryDocument> =
            serde_json::from_str(&content).map_err(|source| {
                tracing::warn!(path = %self.path.display(), error = %source, "history record is corrupt");
                StoreError::Parse {
                    path: self.path.clone(),
                    source,
                }
            })?;
        let doc = doc.unwrap_or_default();

        tracing::debug!(path = %self.path.display(), days = doc.len(), "loaded history");
        Ok(doc)
    }

    async fn save(&self, doc: &HistoryDocument) -> Result<(), StoreError> {
        let mut bytes = serde_json::to_vec_pretty(doc).map_err(StoreError::Serialize)?;
        bytes.push(b'\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.write_error(e))?;
        }

        let tmp = self.temp_path();
        if let Err(e) = tokio::fs::write(&tmp, &bytes).await {
            tracing::warn!(path = %tmp.display(), error = %e, "history write failed");
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(self.write_error(e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            tracing::warn!(path = %self.path.display(), error = %e, "history rename failed");
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(self.write_error(e));
        }

        tracing::debug!(path = %self.path.display(), days = doc.len(), "saved history");
        Ok(())
    }
}
