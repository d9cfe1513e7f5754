//! Persistence of per-file execution status.
//!
//! The orchestrator only depends on the [`StatusStore`] trait. Two
//! implementations are provided:
//!
//! - [`MemoryStore`]: an in-memory map, for tests and one-off inspection
//! - [`JsonFileStore`]: a JSON file rewritten atomically after every change
//!
//! Records are addressed by `(namespace, key)`. The runner keeps its records
//! in [`STATUS_NAMESPACE`](mig_core::STATUS_NAMESPACE) under keys built by
//! [`status_key`](mig_core::status_key).

mod json;
mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

use mig_core::StatusRecord;

use crate::error::StoreError;

/// A namespaced key-value store of [`StatusRecord`]s.
pub trait StatusStore {
    /// Returns the record stored under `(namespace, key)`, if any.
    fn get(&self, namespace: &str, key: &str) -> Option<StatusRecord>;

    /// Returns the stored record, or `default` if there is none.
    fn get_or(&self, namespace: &str, key: &str, default: StatusRecord) -> StatusRecord {
        self.get(namespace, key).unwrap_or(default)
    }

    /// Stores `record` under `(namespace, key)`, replacing any previous value.
    ///
    /// The record must be durable once this returns `Ok`.
    fn set(&mut self, namespace: &str, key: &str, record: StatusRecord) -> Result<(), StoreError>;

    /// Moves every record of namespace `from` to namespace `to`.
    ///
    /// Keys already present under `to` keep their value. Namespace `from` is
    /// removed afterwards. Returns the number of records moved; calling this
    /// again, or when `from` doesn't exist, moves nothing.
    fn rename_namespace(&mut self, from: &str, to: &str) -> Result<usize, StoreError>;
}

impl<S: StatusStore + ?Sized> StatusStore for &mut S {
    fn get(&self, namespace: &str, key: &str) -> Option<StatusRecord> {
        (**self).get(namespace, key)
    }

    fn set(&mut self, namespace: &str, key: &str, record: StatusRecord) -> Result<(), StoreError> {
        (**self).set(namespace, key, record)
    }

    fn rename_namespace(&mut self, from: &str, to: &str) -> Result<usize, StoreError> {
        (**self).rename_namespace(from, to)
    }
}
