//! Progress notifications emitted during a run.
//!
//! The orchestrator doesn't print anything itself. Callers pass an observer
//! to [`Migrator::run_with`](crate::Migrator::run_with) and render events
//! however they like.

use camino::Utf8Path;
use mig_core::{ExecutionResult, MigrationFile};

/// Something that happened during a run.
///
/// Events borrow from the orchestrator and only live for the duration of
/// the observer call.
#[derive(Debug, Clone, Copy)]
pub enum MigrationEvent<'a> {
    /// The migration folder was resolved (and created if necessary).
    FolderResolved(&'a Utf8Path),

    /// A pending file is about to be executed.
    Started(&'a MigrationFile),

    /// A file finished executing, successfully or not.
    Finished {
        /// The executed file.
        file: &'a MigrationFile,
        /// What the executor reported.
        result: &'a ExecutionResult,
    },
}

impl MigrationEvent<'_> {
    /// Returns the file this event is about, if any.
    #[must_use]
    pub const fn file(&self) -> Option<&MigrationFile> {
        match self {
            Self::FolderResolved(_) => None,
            Self::Started(file) | Self::Finished { file, .. } => Some(file),
        }
    }
}
