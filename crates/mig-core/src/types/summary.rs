//! Aggregate outcome of one migration run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Summary of a complete run.
///
/// Because a run halts on the first failure, `errors` holds at most one entry.
///
/// # Examples
///
/// ```
/// use mig_core::RunSummary;
///
/// let mut summary = RunSummary::default();
/// assert!(summary.is_up_to_date());
///
/// summary.record_success(3);
/// summary.record_success(1);
/// assert_eq!(summary.executed_count, 2);
/// assert_eq!(summary.highest_version, 3);
/// assert!(summary.is_success());
///
/// summary.record_failure("4_broken.sql", vec!["ERROR 1064".to_owned()]);
/// assert!(!summary.is_success());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of files newly marked successful during this run.
    pub executed_count: usize,

    /// Highest version among executed files. Informational only.
    pub highest_version: u64,

    /// Error lines keyed by the failing file name.
    pub errors: BTreeMap<String, Vec<String>>,
}

impl RunSummary {
    /// Records a file that ran successfully.
    pub fn record_success(&mut self, version: u64) {
        self.executed_count += 1;
        self.highest_version = self.highest_version.max(version);
    }

    /// Records the file that halted the run.
    pub fn record_failure(&mut self, filename: impl Into<String>, errors: Vec<String>) {
        self.errors.insert(filename.into(), errors);
    }

    /// Returns `true` if no file failed.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns `true` if nothing ran and nothing failed.
    #[inline]
    #[must_use]
    pub fn is_up_to_date(&self) -> bool {
        self.executed_count == 0 && self.errors.is_empty()
    }

    /// Returns the failing file and its error lines, if any.
    #[must_use]
    pub fn failure(&self) -> Option<(&str, &[String])> {
        self.errors
            .iter()
            .next()
            .map(|(file, errors)| (file.as_str(), errors.as_slice()))
    }
}
