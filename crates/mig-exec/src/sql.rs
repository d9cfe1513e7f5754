//! SQL script executor.
//!
//! Feeds a `.sql` file to the configured database client on stdin. Success
//! is decided from the client's output alone: any line containing
//! [`ERROR_MARKER`] fails the migration, whatever the exit status was.

use std::fs::File;
use std::process::{Command, Stdio};

use camino::Utf8Path;
use mig_core::{DatabaseConfig, ExecutionResult, FailureKind};
use tracing::{debug, warn};

use crate::context::ExecContext;
use crate::error::ExecError;
use crate::executor::MigrationExecutor;
use crate::subprocess::{in_dir, resolve_binary, run_command};

/// Substring that marks a client output line as an error.
pub const ERROR_MARKER: &str = "ERROR";

/// Runs SQL migrations through the database client.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlExecutor;

impl MigrationExecutor for SqlExecutor {
    /// Executes the SQL script at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::BinaryNotFound`] before spawning anything if the
    /// client can't be resolved, and [`ExecError::FileUnreadable`] if the
    /// script can't be opened.
    fn execute(&self, path: &Utf8Path, ctx: &ExecContext) -> Result<ExecutionResult, ExecError> {
        let client = resolve_binary(&ctx.binaries.mysql, &ctx.working_dir)
            .ok_or_else(|| ExecError::binary_not_found(ctx.binaries.mysql.as_str()))?;
        let script = File::open(path).map_err(|source| ExecError::file_unreadable(path, source))?;

        let mut command = build_command(client.as_std_path(), &ctx.database);
        in_dir(&mut command, &ctx.working_dir);

        debug!(file = %path, client = %client, "Running SQL script");
        // The exit status is deliberately not consulted.
        let output = run_command(command, Stdio::from(script))?.output;

        let errors = error_lines(&output);
        if errors.is_empty() {
            Ok(ExecutionResult::success(output))
        } else {
            warn!(file = %path, errors = errors.len(), "Database client reported errors");
            Ok(ExecutionResult::failure(FailureKind::ErrorMarker, output, errors))
        }
    }
}

/// Builds the non-interactive client invocation.
///
/// Every option is a separate argument. The password travels in the
/// `MYSQL_PWD` environment variable so it never shows up in process listings.
fn build_command(client: &std::path::Path, database: &DatabaseConfig) -> Command {
    let mut command = Command::new(client);
    command.arg(format!("--default-character-set={}", database.charset));

    if !database.host.is_empty() {
        command.arg(format!("--host={}", database.host));
    }
    if let Some(port) = database.port {
        command.arg(format!("--port={port}"));
    }
    if !database.user.is_empty() {
        command.arg(format!("--user={}", database.user));
    }
    if !database.name.is_empty() {
        command.arg(format!("--database={}", database.name));
    }
    if !database.password.is_empty() {
        command.env("MYSQL_PWD", &database.password);
    }

    command
}

/// Returns every non-blank output line containing [`ERROR_MARKER`].
#[must_use]
pub fn error_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty() && line.contains(ERROR_MARKER))
        .map(ToOwned::to_owned)
        .collect()
}
