//! Identifier generation for history entries.
//!
//! The history service is the only authority for entry identity. It asks an
//! [`IdGenerator`] for each new id, so production code can use random UUIDs
//! while tests get predictable values.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of unique entry identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random UUID v4 identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Deterministic `<prefix>-<n>` identifiers, starting at 1.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, n)
    }
}
