//! Master-data cache and autocomplete suggestion derivation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::MasterCategory;

/// One reference-list entry. Duplicates are legal and simply appear twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterEntry {
    /// Category the value belongs to.
    #[serde(rename = "type")]
    pub category: MasterCategory,
    /// Raw stored text.
    pub value: String,
}

/// Append-only cache of reference lists fetched from the backend.
#[derive(Debug, Default)]
pub struct MasterCache {
    entries: Vec<MasterEntry>,
}

impl MasterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cache with a freshly fetched list.
    pub fn replace_all(&mut self, entries: Vec<MasterEntry>) {
        self.entries = entries;
    }

    /// Appends one locally created entry (optimistic, fire-and-forget write).
    pub fn append(&mut self, entry: MasterEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[MasterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct values for one category, ascending by raw text. No case
    /// normalization: distinctness and order operate on the stored bytes.
    pub fn suggestions(&self, category: MasterCategory) -> Vec<String> {
        let set: BTreeSet<&str> = self
            .entries
            .iter()
            .filter(|e| e.category == category)
            .map(|e| e.value.as_str())
            .collect();
        set.into_iter().map(|v| v.to_string()).collect()
    }
}
