//! SQL, CMS-command and shell migration executors.
//!
//! Each executor takes the path of one migration file plus an
//! [`ExecContext`] and produces an [`ExecutionResult`](mig_core::ExecutionResult):
//!
//! - [`SqlExecutor`]: feeds the script to the database client; fails on any
//!   output line containing `ERROR`, regardless of the exit status
//! - [`CmsExecutor`]: runs one CMS command per line; stops at the first
//!   non-zero exit
//! - [`ShellExecutor`]: runs the script through a POSIX shell; fails on a
//!   non-zero exit
//!
//! [`MigrationKind`](mig_core::MigrationKind) implements [`MigrationExecutor`] by routing to the
//! matching executor, so callers dispatch with `file.kind.execute(..)`.
//!
//! # Example
//!
//! ```ignore
//! use mig_core::{Config, MigrationFile};
//! use mig_exec::{ExecContext, MigrationExecutor};
//!
//! let ctx = ExecContext::from_config(&Config::default());
//! let file = MigrationFile::new("migrations/1_init.sql".into()).unwrap();
//! let result = file.kind.execute(&file.path, &ctx)?;
//! assert!(result.is_success());
//! ```
//!
//! # Subprocesses
//!
//! All programs are started with a discrete argument vector and an explicit
//! working directory. Runs block until the subprocess exits; there is no
//! timeout and no cancellation.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod cms;
mod context;
mod error;
mod executor;
mod shell;
mod sql;
mod subprocess;

pub use cms::{CmsExecutor, command_lines, split_command_line};
pub use context::ExecContext;
pub use error::ExecError;
pub use executor::MigrationExecutor;
pub use shell::ShellExecutor;
pub use sql::{ERROR_MARKER, SqlExecutor, error_lines};
pub use subprocess::{CommandOutput, resolve_binary, run_command};
