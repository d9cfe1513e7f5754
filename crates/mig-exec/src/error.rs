//! Error types for the mig-exec crate.
//!
//! This module provides the [`ExecError`] type for failures that prevent a
//! migration file from being executed at all. A migration that runs and
//! fails is not an error here; it is a failed
//! [`ExecutionResult`](mig_core::ExecutionResult).

use camino::Utf8PathBuf;

/// Errors that prevent a migration file from running.
///
/// Every variant is local to one file. The runner turns it into a failed
/// result for that file, which halts the run.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The configured program doesn't exist or isn't executable.
    #[error("binary not found or not executable: {binary}")]
    BinaryNotFound {
        /// The program as configured.
        binary: String,
    },

    /// The migration file couldn't be read.
    #[error("failed to read migration file {path}: {source}")]
    FileUnreadable {
        /// The migration file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A command line in a CMS command file couldn't be split into arguments.
    #[error("invalid command line '{line}': {reason}")]
    InvalidCommandLine {
        /// The offending line.
        line: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The program exists but couldn't be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// The program that failed to start.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O error while collecting subprocess output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExecError {
    /// Creates a new [`ExecError::BinaryNotFound`] error.
    #[inline]
    pub fn binary_not_found(binary: impl Into<String>) -> Self {
        Self::BinaryNotFound {
            binary: binary.into(),
        }
    }

    /// Creates a new [`ExecError::FileUnreadable`] error.
    #[inline]
    pub fn file_unreadable(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::FileUnreadable {
            path: path.into(),
            source,
        }
    }
}
