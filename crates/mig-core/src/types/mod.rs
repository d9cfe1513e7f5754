//! Domain types for the migration runner.
//!
//! # Module Organization
//!
//! - [`file`] - Migration files and their executor kind
//! - [`result`] - Outcome of executing one file
//! - [`status`] - Persisted per-file status records
//! - [`summary`] - Aggregate outcome of a run
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use mig_core::{ExecutionResult, MigrationFile, RunSummary, StatusRecord};
//! ```

mod file;
mod result;
mod status;
mod summary;

pub use file::{MigrationFile, MigrationKind, parse_version};
pub use result::{ExecutionResult, FailureKind};
pub use status::{
    LEGACY_STATUS_NAMESPACE, STATUS_KEY_PREFIX, STATUS_NAMESPACE, StatusRecord, status_key,
    unix_timestamp,
};
pub use summary::RunSummary;
