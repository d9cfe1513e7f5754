//! Read-only view of what a run would do.

use mig_core::{MigrationFile, MigrationKind};
use serde::Serialize;

/// State of one migration file as seen by the status store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlanState {
    /// Already ran successfully; a run skips it.
    Applied {
        /// When it was applied, in seconds since the Unix epoch.
        timestamp: Option<u64>,
    },
    /// Not applied yet; a run executes it.
    Pending,
    /// Not a migration; a run passes over it.
    Ignored,
}

impl PlanState {
    /// Returns a short human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Applied { .. } => "applied",
            Self::Pending => "pending",
            Self::Ignored => "ignored",
        }
    }
}

/// One regular file of the migration folder, in run order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    /// File name.
    pub filename: String,
    /// Executor family.
    pub kind: MigrationKind,
    /// Version parsed from the file name.
    pub version: u64,
    /// Current state.
    #[serde(flatten)]
    pub state: PlanState,
}

impl PlanEntry {
    pub(crate) fn new(file: MigrationFile, state: PlanState) -> Self {
        Self {
            filename: file.filename,
            kind: file.kind,
            version: file.version,
            state,
        }
    }

    /// Returns `true` if a run would execute this file.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state == PlanState::Pending
    }
}
