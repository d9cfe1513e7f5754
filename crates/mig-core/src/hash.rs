//! Fast hash map type aliases.
//!
//! Status records are keyed by short strings (namespaces and
//! `migrationStatus:<filename>` keys), which is where the Fx hash algorithm
//! from the `rustc-hash` crate does best. Keys are never attacker-controlled,
//! so denial-of-service resistance is not required.
//!
//! # Examples
//!
//! ```
//! use mig_core::{FxHashMap, fx_hash_map};
//!
//! let mut map: FxHashMap<String, bool> = fx_hash_map();
//! map.insert("migrationStatus:1_init.sql".to_owned(), true);
//! assert_eq!(map.len(), 1);
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// Creates a new empty [`FxHashMap`].
///
/// This is equivalent to `FxHashMap::default()` but can be more ergonomic
/// in some contexts due to type inference.
#[inline]
#[must_use]
pub fn fx_hash_map<K, V>() -> FxHashMap<K, V> {
    FxHashMap::default()
}
