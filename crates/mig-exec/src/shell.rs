//! Shell script executor.
//!
//! Runs `<shell> <script>` with the application's public root as working
//! directory. The shell is looked up on `PATH` unless configured as a path.

use std::process::{Command, Stdio};

use camino::Utf8Path;
use mig_core::{ExecutionResult, FailureKind};
use tracing::{debug, warn};

use crate::context::ExecContext;
use crate::error::ExecError;
use crate::executor::MigrationExecutor;
use crate::subprocess::{in_dir, run_command};

/// Runs shell-script migrations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellExecutor;

impl MigrationExecutor for ShellExecutor {
    /// Executes the shell script at `path`.
    ///
    /// The migration fails iff the script exits non-zero; its captured output
    /// becomes the error text.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::FileUnreadable`] if the script doesn't exist and
    /// [`ExecError::BinaryNotFound`] if the shell can't be found.
    fn execute(&self, path: &Utf8Path, ctx: &ExecContext) -> Result<ExecutionResult, ExecError> {
        // The shell would report a missing script as a plain exit status 127.
        std::fs::metadata(path).map_err(|source| ExecError::file_unreadable(path, source))?;

        let mut command = Command::new(&ctx.binaries.shell);
        command.arg(path);
        in_dir(&mut command, &ctx.working_dir);

        debug!(file = %path, shell = %ctx.binaries.shell, "Running shell script");
        let result = run_command(command, Stdio::null())?;
        let output = result.output.trim_end().to_owned();

        if result.success() {
            Ok(ExecutionResult::success(output))
        } else {
            warn!(file = %path, code = ?result.code, "Shell script failed");
            Ok(ExecutionResult::failure(
                FailureKind::NonZeroExit(result.code),
                output,
                Vec::new(),
            ))
        }
    }
}
