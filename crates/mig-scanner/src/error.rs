//! Error types for the mig-scanner crate.
//!
//! This module provides the [`ScanError`] type for errors that can occur
//! while listing a migration folder.

use camino::Utf8PathBuf;

/// Errors that can occur while listing a directory.
///
/// All variants are fatal to a listing: a partially listed folder would break
/// the ordering guarantee, so nothing is returned on error.
///
/// # Examples
///
/// ```
/// use mig_scanner::ScanError;
/// use camino::Utf8PathBuf;
///
/// fn handle_error(err: ScanError) {
///     match err {
///         ScanError::DirectoryNotFound(p) => eprintln!("missing: {p}"),
///         ScanError::Walk(e) => eprintln!("walk error: {e}"),
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The path does not exist or is not a directory.
    #[error("directory not found: {0}")]
    DirectoryNotFound(Utf8PathBuf),

    /// Failed to read the directory or one of its entries.
    #[error("failed to read directory: {0}")]
    Walk(#[from] ignore::Error),
}

impl ScanError {
    /// Creates a new [`ScanError::DirectoryNotFound`] error.
    #[inline]
    pub fn directory_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::DirectoryNotFound(path.into())
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::DirectoryNotFound(path) => Some(path),
            Self::Walk(_) => None,
        }
    }
}
