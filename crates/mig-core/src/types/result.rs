//! Outcome of executing a single migration file.

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

/// Why a migration failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A subprocess exited with a non-zero status (`None` when killed by a signal).
    NonZeroExit(Option<i32>),
    /// The database client printed a line containing the error marker.
    ErrorMarker,
    /// The executor could not run the file at all (missing binary, unreadable file, ...).
    Executor,
}

/// Result of running one migration file.
///
/// `errors` is empty iff the result is a success; the constructors enforce
/// this, falling back to the captured output (or a generic line) when a
/// failure carries no explicit error lines.
///
/// # Examples
///
/// ```
/// use mig_core::{ExecutionResult, FailureKind};
///
/// let ok = ExecutionResult::success("Query OK");
/// assert!(ok.is_success());
/// assert!(ok.errors().is_empty());
///
/// let failed = ExecutionResult::failure(FailureKind::NonZeroExit(Some(2)), "boom", Vec::new());
/// assert!(!failed.is_success());
/// assert_eq!(failed.errors(), ["boom"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    output: String,
    errors: SmallVec<[String; 1]>,
    failure: Option<FailureKind>,
}

impl ExecutionResult {
    /// A successful result with the captured output.
    #[must_use]
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            errors: SmallVec::new(),
            failure: None,
        }
    }

    /// A failed result.
    ///
    /// If `errors` is empty the trimmed output becomes the single error line,
    /// or a description of `kind` when the output is blank too.
    #[must_use]
    pub fn failure(
        kind: FailureKind,
        output: impl Into<String>,
        errors: impl IntoIterator<Item = String>,
    ) -> Self {
        let output = output.into();
        let mut errors: SmallVec<[String; 1]> = errors.into_iter().collect();
        if errors.is_empty() {
            let fallback = match output.trim() {
                "" => describe(kind),
                trimmed => trimmed.to_owned(),
            };
            errors = smallvec![fallback];
        }

        Self {
            output,
            errors,
            failure: Some(kind),
        }
    }

    /// Returns `true` if the migration succeeded.
    #[inline]
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Captured output of the migration, possibly multi-line.
    #[inline]
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Error lines, in the order they were found.
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Why the migration failed, if it did.
    #[inline]
    #[must_use]
    pub const fn failure_kind(&self) -> Option<FailureKind> {
        self.failure
    }

    /// Consumes the result, returning its error lines.
    #[must_use]
    pub fn into_errors(self) -> Vec<String> {
        self.errors.into_vec()
    }
}

fn describe(kind: FailureKind) -> String {
    match kind {
        FailureKind::NonZeroExit(Some(code)) => format!("process exited with status {code}"),
        FailureKind::NonZeroExit(None) => "process terminated by signal".to_owned(),
        FailureKind::ErrorMarker => "database client reported an error".to_owned(),
        FailureKind::Executor => "migration could not be executed".to_owned(),
    }
}
