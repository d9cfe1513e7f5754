//! Single-level, byte-ordered directory listing.
//!
//! This module provides [`DirectoryLister`], which lists the direct children
//! of a directory sorted by file name using plain byte comparison, so
//! `10_c.sql` sorts before `2_b.sql`.
//!
//! Entries of every type are returned; callers decide what to do with
//! directories, symbolic links and other special files.
//!
//! # Examples
//!
//! ```ignore
//! use mig_scanner::DirectoryLister;
//! use camino::Utf8Path;
//!
//! let lister = DirectoryLister::new(Utf8Path::new("./migrations"))?;
//! for entry in lister.list()? {
//!     if entry.is_file() {
//!         println!("{}", entry.name);
//!     }
//! }
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::error::ScanError;

/// Type of a directory entry, as seen without following symbolic links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// A symbolic link.
    Symlink,
    /// Anything else (sockets, FIFOs, devices).
    Other,
}

impl EntryKind {
    fn from_file_type(file_type: Option<std::fs::FileType>) -> Self {
        match file_type {
            Some(ft) if ft.is_file() => Self::File,
            Some(ft) if ft.is_dir() => Self::Directory,
            Some(ft) if ft.is_symlink() => Self::Symlink,
            _ => Self::Other,
        }
    }
}

/// One direct child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// File name of the entry.
    pub name: String,
    /// Full path of the entry.
    pub path: Utf8PathBuf,
    /// Entry type.
    pub kind: EntryKind,
}

impl DirEntry {
    /// Returns `true` if the entry is a regular file.
    #[inline]
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Lists the direct children of a directory in byte order.
///
/// Listing the same unchanged directory twice yields the same sequence.
#[derive(Debug)]
pub struct DirectoryLister {
    /// The directory to list.
    root: Utf8PathBuf,
}

impl DirectoryLister {
    /// Creates a lister for `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::DirectoryNotFound`] if `root` doesn't exist or
    /// isn't a directory.
    pub fn new(root: &Utf8Path) -> Result<Self, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::directory_not_found(root));
        }

        Ok(Self {
            root: root.to_owned(),
        })
    }

    /// Lists every direct child of the root, sorted by name.
    ///
    /// `.` and `..` are never included.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Walk`] if the directory can't be read. Entries
    /// whose name is not valid UTF-8 are logged and left out.
    pub fn list(&self) -> Result<Vec<DirEntry>, ScanError> {
        let mut entries = Vec::new();

        for result in self.build_walker() {
            let entry = result?;

            // depth 0 is the root itself
            if entry.depth() == 0 {
                continue;
            }

            let Some(path) = Utf8Path::from_path(entry.path()) else {
                warn!(path = %entry.path().display(), "Skipping entry with non-UTF-8 name");
                continue;
            };
            let Some(name) = path.file_name() else {
                continue;
            };

            entries.push(DirEntry {
                name: name.to_owned(),
                path: path.to_owned(),
                kind: EntryKind::from_file_type(entry.file_type()),
            });
        }

        debug!(root = %self.root, count = entries.len(), "Listed directory");
        Ok(entries)
    }

    /// Builds a single-level walker that sees every entry, hidden or ignored.
    fn build_walker(&self) -> ignore::Walk {
        WalkBuilder::new(&self.root)
            .max_depth(Some(1))
            // No .gitignore, .ignore or hidden-file filtering
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.as_encoded_bytes().cmp(b.as_encoded_bytes()))
            .build()
    }

    /// Returns the directory being listed.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

/// Lists `path` in byte order.
///
/// Shorthand for [`DirectoryLister::new`] followed by [`DirectoryLister::list`].
pub fn list_directory(path: &Utf8Path) -> Result<Vec<DirEntry>, ScanError> {
    DirectoryLister::new(path)?.list()
}
