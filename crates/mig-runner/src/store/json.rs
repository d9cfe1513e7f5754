//! JSON file backed status store.
//!
//! The file holds one object per namespace:
//!
//! ```json
//! {
//!   "migrator.status": {
//!     "migrationStatus:1_init.sql": { "timestamp": 1700000000, "success": true }
//!   }
//! }
//! ```
//!
//! It is read once on open and rewritten as a whole after every change. Each
//! rewrite goes to a temporary file in the same directory which is synced
//! and then renamed over the original, so a crash leaves either the old or
//! the new content, never a torn file.

use std::collections::BTreeMap;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use mig_core::StatusRecord;
use tempfile::NamedTempFile;
use tracing::debug;

use super::{MemoryStore, StatusStore};
use crate::error::StoreError;

/// A [`StatusStore`] persisted to a JSON file.
///
/// # Examples
///
/// ```ignore
/// use mig_core::{StatusRecord, STATUS_NAMESPACE};
/// use mig_runner::{JsonFileStore, StatusStore};
///
/// let mut store = JsonFileStore::open("status.json".into())?;
/// store.set(STATUS_NAMESPACE, "migrationStatus:1_init.sql", StatusRecord::applied_now())?;
/// ```
#[derive(Debug)]
pub struct JsonFileStore {
    path: Utf8PathBuf,
    records: MemoryStore,
}

impl JsonFileStore {
    /// Opens the store at `path`.
    ///
    /// A missing or empty file is an empty store. Nothing is written until
    /// the first change.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the file exists but can't be read and
    /// [`StoreError::Corrupt`] if it doesn't contain a valid store.
    pub fn open(path: Utf8PathBuf) -> Result<Self, StoreError> {
        let records = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => MemoryStore::new(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => MemoryStore::new(),
            Err(err) => return Err(StoreError::read(path, err)),
        };

        debug!(path = %path, "Opened status store");
        Ok(Self { path, records })
    }

    /// Returns the path of the backing file.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns the in-memory view of the stored records.
    #[inline]
    #[must_use]
    pub const fn records(&self) -> &MemoryStore {
        &self.records
    }

    /// Atomically rewrites the backing file from the in-memory records.
    fn persist(&self) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|err| StoreError::write(&self.path, err))?;

        // BTreeMap for a stable, diff-friendly file
        let sorted: BTreeMap<&str, BTreeMap<&str, StatusRecord>> = self
            .records
            .namespace_names()
            .into_iter()
            .map(|ns| (ns, self.records.records(ns).into_iter().collect()))
            .collect();
        let mut json = serde_json::to_vec_pretty(&sorted).map_err(StoreError::Serialize)?;
        json.push(b'\n');

        let write_err = |err| StoreError::write(&self.path, err);
        let mut file = NamedTempFile::new_in(dir).map_err(write_err)?;
        file.write_all(&json).map_err(write_err)?;
        file.as_file().sync_all().map_err(write_err)?;
        file.persist(&self.path)
            .map_err(|err| StoreError::write(&self.path, err.error))?;

        debug!(path = %self.path, bytes = json.len(), "Persisted status store");
        Ok(())
    }
}

impl StatusStore for JsonFileStore {
    fn get(&self, namespace: &str, key: &str) -> Option<StatusRecord> {
        self.records.get(namespace, key)
    }

    fn set(&mut self, namespace: &str, key: &str, record: StatusRecord) -> Result<(), StoreError> {
        self.records.insert(namespace, key, record);
        self.persist()
    }

    fn rename_namespace(&mut self, from: &str, to: &str) -> Result<usize, StoreError> {
        if from == to || !self.records.contains_namespace(from) {
            return Ok(0);
        }

        let moved = self.records.move_namespace(from, to);
        self.persist()?;
        Ok(moved)
    }
}
