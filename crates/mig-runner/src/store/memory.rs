//! In-memory status store.

use mig_core::{FxHashMap, StatusRecord, fx_hash_map};
use serde::{Deserialize, Serialize};

use super::StatusStore;
use crate::error::StoreError;

/// A [`StatusStore`] that keeps everything in memory.
///
/// Nothing survives the process. [`JsonFileStore`](super::JsonFileStore)
/// uses it as its working copy.
///
/// # Examples
///
/// ```
/// use mig_core::StatusRecord;
/// use mig_runner::{MemoryStore, StatusStore};
///
/// let mut store = MemoryStore::new();
/// store.set("ns", "key", StatusRecord::applied_at(1)).unwrap();
/// assert!(store.get_or("ns", "key", StatusRecord::default()).is_applied());
/// assert!(!store.get_or("ns", "other", StatusRecord::default()).is_applied());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    namespaces: FxHashMap<String, FxHashMap<String, StatusRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `namespace` exists, even without records.
    #[must_use]
    pub fn contains_namespace(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }

    /// Returns the names of all namespaces, sorted.
    #[must_use]
    pub fn namespace_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.namespaces.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of records in `namespace`.
    #[must_use]
    pub fn len(&self, namespace: &str) -> usize {
        self.namespaces.get(namespace).map_or(0, FxHashMap::len)
    }

    /// Returns `true` if no namespace holds any record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.namespaces.values().all(FxHashMap::is_empty)
    }

    /// Returns the records of `namespace`, sorted by key.
    #[must_use]
    pub fn records(&self, namespace: &str) -> Vec<(&str, StatusRecord)> {
        let mut records: Vec<_> = self
            .namespaces
            .get(namespace)
            .into_iter()
            .flatten()
            .map(|(key, record)| (key.as_str(), *record))
            .collect();
        records.sort_unstable_by(|a, b| a.0.cmp(b.0));
        records
    }

    /// Infallible version of [`StatusStore::set`].
    pub fn insert(&mut self, namespace: &str, key: &str, record: StatusRecord) {
        self.namespaces
            .entry(namespace.to_owned())
            .or_insert_with(fx_hash_map)
            .insert(key.to_owned(), record);
    }

    /// Infallible version of [`StatusStore::rename_namespace`].
    pub fn move_namespace(&mut self, from: &str, to: &str) -> usize {
        if from == to {
            return 0;
        }
        let Some(legacy) = self.namespaces.remove(from) else {
            return 0;
        };

        let current = self.namespaces.entry(to.to_owned()).or_insert_with(fx_hash_map);
        let mut moved = 0;
        for (key, record) in legacy {
            if !current.contains_key(&key) {
                current.insert(key, record);
                moved += 1;
            }
        }
        moved
    }
}

impl StatusStore for MemoryStore {
    fn get(&self, namespace: &str, key: &str) -> Option<StatusRecord> {
        self.namespaces.get(namespace)?.get(key).copied()
    }

    fn set(&mut self, namespace: &str, key: &str, record: StatusRecord) -> Result<(), StoreError> {
        self.insert(namespace, key, record);
        Ok(())
    }

    fn rename_namespace(&mut self, from: &str, to: &str) -> Result<usize, StoreError> {
        Ok(self.move_namespace(from, to))
    }
}
