//! Deterministic listing of migration folders.
//!
//! This crate answers one question for the runner: which entries does the
//! migration folder contain, and in what order should they be considered?
//!
//! - [`DirectoryLister`]: direct children only, byte-wise sorted by name
//! - [`DirEntry`]/[`EntryKind`]: entry name, path and type (symlinks not followed)
//! - [`ScanError`]: missing directories and unreadable entries
//!
//! Ordering is lexicographic on the raw file name bytes. It is neither
//! numeric nor locale-aware, which is why migrations are conventionally named
//! with zero-padded version prefixes.
//!
//! # Example
//!
//! ```ignore
//! use mig_scanner::list_directory;
//! use camino::Utf8Path;
//!
//! let entries = list_directory(Utf8Path::new("./migrations"))?;
//! let files: Vec<_> = entries.iter().filter(|e| e.is_file()).collect();
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod lister;

pub use error::ScanError;
pub use lister::{DirEntry, DirectoryLister, EntryKind, list_directory};
