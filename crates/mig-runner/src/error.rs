//! Error types for the mig-runner crate.
//!
//! - [`StoreError`]: the status store couldn't be loaded or persisted
//! - [`RunError`]: a run couldn't start or had to be aborted
//!
//! A migration that fails is *not* an error here. It ends up in the
//! [`RunSummary`](mig_core::RunSummary) of an otherwise successful call.

use camino::Utf8PathBuf;
use mig_scanner::ScanError;

/// Errors raised by [`StatusStore`](crate::StatusStore) implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The status file exists but couldn't be read.
    #[error("failed to read status file {path}: {source}")]
    Read {
        /// The status file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The status file isn't valid JSON of the expected shape.
    #[error("status file {path} is corrupt: {source}")]
    Corrupt {
        /// The status file.
        path: Utf8PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The status file couldn't be written.
    #[error("failed to write status file {path}: {source}")]
    Write {
        /// The status file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The records couldn't be serialized.
    #[error("failed to serialize status records: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StoreError {
    /// Creates a new [`StoreError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`StoreError::Write`] error.
    #[inline]
    pub fn write(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Returns the status file associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Read { path, .. } | Self::Corrupt { path, .. } | Self::Write { path, .. } => {
                Some(path)
            }
            Self::Serialize(_) => None,
        }
    }
}

/// Errors that abort a migration run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The migration folder doesn't exist and couldn't be created.
    ///
    /// Raised before any file is looked at.
    #[error("migration folder not found. Please make sure \"{path}\" exists! ({source})")]
    MigrationFolderNotFound {
        /// The configured folder, resolved against the public root.
        path: Utf8PathBuf,
        /// Why creating or resolving it failed.
        #[source]
        source: std::io::Error,
    },

    /// The migration folder couldn't be listed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// The status store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RunError {
    /// Creates a new [`RunError::MigrationFolderNotFound`] error.
    #[inline]
    pub fn folder_not_found(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::MigrationFolderNotFound {
            path: path.into(),
            source,
        }
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::MigrationFolderNotFound { path, .. } => Some(path),
            Self::Scan(err) => err.path(),
            Self::Store(err) => err.path(),
        }
    }
}
