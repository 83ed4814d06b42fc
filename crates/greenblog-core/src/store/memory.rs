//! In-memory [`HistoryStore`] implementation for tests and embedding.
//!
//! Holds a single [`HistoryDocument`] behind `std::sync::RwLock`. `load`
//! returns a clone, `save` replaces the whole map, mirroring the
//! file-backed store's semantics.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::models::HistoryDocument;

use super::{HistoryStore, StoreError};

/// In-memory store for testing.
pub struct InMemoryStore {
    doc: RwLock<HistoryDocument>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_document(HistoryDocument::new())
    }

    /// Seed the store with an existing document.
    pub fn with_document(doc: HistoryDocument) -> Self {
        Self {
            doc: RwLock::new(doc),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for InMemoryStore {
    async fn load(&self) -> Result<HistoryDocument, StoreError> {
        let doc = self.doc.read().unwrap_or_else(PoisonError::into_inner);
        Ok(doc.clone())
    }

    async fn save(&self, doc: &HistoryDocument) -> Result<(), StoreError> {
        let mut stored = self.doc.write().unwrap_or_else(PoisonError::into_inner);
        *stored = doc.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HistoryEntry;

    fn entry(id: &str) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            date: "01.01.2026".to_string(),
            specific_name: "Linsencurry".to_string(),
            rating: 4,
            comment: String::new(),
            recipe_link: None,
        }
    }

    #[tokio::test]
    async fn test_empty_store_loads_empty_document() {
        let store = InMemoryStore::new();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_replaces_document() {
        let mut seeded = HistoryDocument::new();
        seeded.insert("montag".to_string(), vec![entry("a")]);
        let store = InMemoryStore::with_document(seeded);

        let mut replacement = HistoryDocument::new();
        replacement.insert("dienstag".to_string(), vec![entry("b")]);
        store.save(&replacement).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, replacement);
        assert!(!loaded.contains_key("montag"));
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let store = InMemoryStore::new();
        let mut doc = HistoryDocument::new();
        doc.insert("freitag".to_string(), vec![entry("x"), entry("y")]);
        store.save(&doc).await.unwrap();

        let first = store.load().await.unwrap();
        store.save(&first).await.unwrap();
        assert_eq!(store.load().await.unwrap(), doc);
    }
}
