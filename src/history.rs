//! History service: list and append over a [`HistoryStore`].
//!
//! Every call round-trips through the store. `append` runs its
//! load → mutate → save sequence under an in-process mutex, so two
//! concurrent appends never overwrite each other. Other processes writing
//! the same file are not coordinated with.

use std::sync::Arc;

use greenblog_core::ids::{IdGenerator, UuidIds};
use greenblog_core::models::{EntryDraft, HistoryDocument, HistoryEntry};
use greenblog_core::store::{HistoryStore, StoreError};
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Validation(String),
}

pub struct HistoryService {
    store: Arc<dyn HistoryStore>,
    ids: Arc<dyn IdGenerator>,
    write_lock: Mutex<()>,
}

impl HistoryService {
    /// Service with random UUID entry ids.
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self::with_ids(store, Arc::new(UuidIds))
    }

    pub fn with_ids(store: Arc<dyn HistoryStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            store,
            ids,
            write_lock: Mutex::new(()),
        }
    }

    /// The full document, exactly as stored.
    pub async fn list(&self) -> Result<HistoryDocument, HistoryError> {
        Ok(self.store.load().await?)
    }

    /// Record a new entry for `day_id` and return it with its assigned id.
    ///
    /// The entry goes to the front of the day's list. Unknown days are
    /// created on demand. Nothing is persisted if loading or saving fails.
    pub async fn append(
        &self,
        day_id: &str,
        draft: EntryDraft,
    ) -> Result<HistoryEntry, HistoryError> {
        if day_id.is_empty() {
            return Err(HistoryError::Validation(
                "day id must not be empty".to_string(),
            ));
        }

        let _guard = self.write_lock.lock().await;

        let mut doc = self.store.load().await?;
        let entry = draft.into_entry(self.ids.next_id());
        doc.entry(day_id.to_string())
            .or_default()
            .insert(0, entry.clone());
        self.store.save(&doc).await?;

        tracing::info!(day = day_id, id = %entry.id, "appended history entry");
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use greenblog_core::ids::SequentialIds;
    use crate::file_store::JsonFileStore;
    use greenblog_core::store::memory::InMemoryStore;
    use std::path::PathBuf;

    fn draft(name: &str, rating: i32) -> EntryDraft {
        EntryDraft {
            date: "01.01.2026".to_string(),
            specific_name: name.to_string(),
            rating,
            comment: "gut".to_string(),
            recipe_link: None,
        }
    }

    fn service(store: Arc<InMemoryStore>) -> HistoryService {
        HistoryService::with_ids(store, Arc::new(SequentialIds::new("h")))
    }

    /// Loads fine, rejects every save.
    struct ReadOnlyStore {
        inner: InMemoryStore,
    }

    #[async_trait]
    impl HistoryStore for ReadOnlyStore {
        async fn load(&self) -> Result<HistoryDocument, StoreError> {
            self.inner.load().await
        }

        async fn save(&self, _doc: &HistoryDocument) -> Result<(), StoreError> {
            Err(StoreError::Write {
                path: PathBuf::from("history.json"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    #[tokio::test]
    async fn test_list_empty() {
        let svc = service(Arc::new(InMemoryStore::new()));
        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_returns_persisted_entry() {
        let svc = service(Arc::new(InMemoryStore::new()));
        let entry = svc.append("montag", draft("Testgericht", 4)).await.unwrap();

        assert_eq!(entry.id, "h-1");
        assert_eq!(entry.specific_name, "Testgericht");
        assert_eq!(entry.rating, 4);

        let doc = svc.list().await.unwrap();
        assert_eq!(doc["montag"][0], entry);
    }

    #[tokio::test]
    async fn test_append_orders_newest_first() {
        let svc = service(Arc::new(InMemoryStore::new()));
        for i in 1..=4 {
            svc.append("mittwoch", draft(&format!("Gericht {}", i), 3))
                .await
                .unwrap();
        }

        let doc = svc.list().await.unwrap();
        let ids: Vec<&str> = doc["mittwoch"].iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["h-4", "h-3", "h-2", "h-1"]);
    }

    #[tokio::test]
    async fn test_identical_drafts_get_distinct_ids() {
        let svc = HistoryService::new(Arc::new(InMemoryStore::new()));
        let a = svc.append("montag", draft("Pasta", 5)).await.unwrap();
        let b = svc.append("montag", draft("Pasta", 5)).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_days_are_independent() {
        let svc = service(Arc::new(InMemoryStore::new()));
        svc.append("montag", draft("Pasta", 5)).await.unwrap();
        svc.append("dienstag", draft("Curry", 4)).await.unwrap();

        let doc = svc.list().await.unwrap();
        assert_eq!(doc["montag"].len(), 1);
        assert_eq!(doc["dienstag"].len(), 1);
        assert_eq!(doc["dienstag"][0].specific_name, "Curry");
    }

    #[tokio::test]
    async fn test_unknown_day_created_on_demand() {
        let svc = service(Arc::new(InMemoryStore::new()));
        svc.append("sonderwoche-7", draft("Eintopf", 2)).await.unwrap();
        assert!(svc.list().await.unwrap().contains_key("sonderwoche-7"));
    }

    #[tokio::test]
    async fn test_empty_day_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let svc = service(store.clone());
        let err = svc.append("", draft("Pasta", 5)).await.unwrap_err();
        assert!(matches!(err, HistoryError::Validation(_)));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reads_are_idempotent() {
        let svc = service(Arc::new(InMemoryStore::new()));
        svc.append("montag", draft("Pasta", 5)).await.unwrap();
        let first = svc.list().await.unwrap();
        let second = svc.list().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_document_unchanged() {
        let mut seeded = HistoryDocument::new();
        seeded.insert(
            "montag".to_string(),
            vec![draft("Alt", 3).into_entry("old".to_string())],
        );
        let store = Arc::new(ReadOnlyStore {
            inner: InMemoryStore::with_document(seeded.clone()),
        });
        let svc = HistoryService::with_ids(store.clone(), Arc::new(SequentialIds::new("h")));

        let err = svc.append("montag", draft("Neu", 5)).await.unwrap_err();
        match err {
            HistoryError::Store(e) => assert!(e.is_write()),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(svc.list().await.unwrap(), seeded);
    }

    /// Yields between reading and handing back the document, so unguarded
    /// load-mutate-save sequences interleave.
    struct YieldingStore {
        inner: InMemoryStore,
    }

    #[async_trait]
    impl HistoryStore for YieldingStore {
        async fn load(&self) -> Result<HistoryDocument, StoreError> {
            let doc = self.inner.load().await?;
            tokio::task::yield_now().await;
            Ok(doc)
        }

        async fn save(&self, doc: &HistoryDocument) -> Result<(), StoreError> {
            tokio::task::yield_now().await;
            self.inner.save(doc).await
        }
    }

    async fn append_concurrently(svc: Arc<HistoryService>, count: usize) {
        let mut handles = Vec::new();
        for i in 0..count {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                let day = if i % 2 == 0 { "montag" } else { "dienstag" };
                svc.append(day, draft("Pasta", 5)).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_do_not_lose_updates() {
        let store = Arc::new(YieldingStore {
            inner: InMemoryStore::new(),
        });
        let svc = Arc::new(HistoryService::with_ids(
            store,
            Arc::new(SequentialIds::new("h")),
        ));
        append_concurrently(svc.clone(), 32).await;

        let doc = svc.list().await.unwrap();
        assert_eq!(doc["montag"].len(), 16);
        assert_eq!(doc["dienstag"].len(), 16);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_to_json_file_all_persist() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("data").join("history.json");
        let svc = Arc::new(HistoryService::new(Arc::new(JsonFileStore::new(&path))));
        append_concurrently(svc, 32).await;

        let reloaded = JsonFileStore::new(&path).load().await.unwrap();
        let total: usize = reloaded.values().map(Vec::len).sum();
        assert_eq!(total, 32);
        assert_eq!(reloaded["montag"].len(), 16);
        assert_eq!(reloaded["dienstag"].len(), 16);
    }
}
