//! History data model.
//!
//! A [`HistoryDocument`] maps a day identifier (e.g. `"montag"`) to the
//! entries recorded for that day, newest first. Insertion order is
//! authoritative; the `date` field is display text and is never parsed.
//!
//! All types serialize in camelCase, which is both the HTTP wire format and
//! the on-disk format. Earlier data files were written with PascalCase keys
//! (`Id`, `SpecificName`, ...); those are accepted as aliases when reading.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The full persisted collection of history entries, keyed by day identifier.
pub type HistoryDocument = BTreeMap<String, Vec<HistoryEntry>>;

/// One recorded evaluation of a dish cooked on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Server-assigned identifier. Never taken from the client.
    #[serde(alias = "Id")]
    pub id: String,
    /// Free-form display date, e.g. `"22.02.2026"`.
    #[serde(default, alias = "Date")]
    pub date: String,
    /// The specific dish that was cooked.
    #[serde(default, alias = "SpecificName")]
    pub specific_name: String,
    /// Expected to be 1–5 but stored as given.
    #[serde(default, alias = "Rating")]
    pub rating: i32,
    #[serde(default, alias = "Comment")]
    pub comment: String,
    #[serde(default, alias = "RecipeLink")]
    pub recipe_link: Option<String>,
}

/// Client-supplied payload for a new entry.
///
/// Every field is optional on the wire and falls back to its default. An
/// `id` sent by the client is not part of this type and is dropped during
/// deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryDraft {
    pub date: String,
    pub specific_name: String,
    pub rating: i32,
    pub comment: String,
    pub recipe_link: Option<String>,
}

impl EntryDraft {
    /// Attach a server-generated identifier, producing a storable entry.
    pub fn into_entry(self, id: String) -> HistoryEntry {
        HistoryEntry {
            id,
            date: self.date,
            specific_name: self.specific_name,
            rating: self.rating,
            comment: self.comment,
            recipe_link: self.recipe_link,
        }
    }
}
