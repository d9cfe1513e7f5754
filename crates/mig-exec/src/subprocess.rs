//! Shared subprocess plumbing.
//!
//! Provides [`run_command`], the blocking spawn + capture logic used by all
//! three executors, and [`resolve_binary`] for checking that a configured
//! program can actually be run. Each executor builds a
//! [`std::process::Command`] with a discrete argument vector and delegates
//! the rest here; no command line is ever handed to a shell as a string.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::error::ExecError;

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// stdout and stderr, interleaved in the order they were written.
    pub output: String,
    /// Exit code, or `None` if the process was killed by a signal.
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Returns `true` if the process exited with status zero.
    #[inline]
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Sets the working directory of `command`, unless `dir` is empty.
pub(crate) fn in_dir<'a>(command: &'a mut Command, dir: &Utf8Path) -> &'a mut Command {
    if !dir.as_str().is_empty() {
        command.current_dir(dir);
    }
    command
}

/// Runs `command` to completion and captures its combined output.
///
/// stdout and stderr share one pipe, matching `2>&1`. The call blocks until
/// the process exits; there is no timeout.
///
/// # Errors
///
/// Returns [`ExecError::BinaryNotFound`] if the program doesn't exist,
/// [`ExecError::Spawn`] if it can't be started for any other reason, and
/// [`ExecError::Io`] if reading its output or waiting for it fails.
pub fn run_command(mut command: Command, stdin: Stdio) -> Result<CommandOutput, ExecError> {
    let program = command.get_program().to_string_lossy().into_owned();
    let (mut reader, writer) = std::io::pipe()?;

    command
        .stdin(stdin)
        .stdout(writer.try_clone()?)
        .stderr(writer);

    debug!(program = %program, "Spawning subprocess");
    let mut child = command.spawn().map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ExecError::binary_not_found(program.clone())
        } else {
            ExecError::Spawn {
                program: program.clone(),
                source,
            }
        }
    })?;

    // The command still owns the write ends; EOF only arrives once they are closed.
    drop(command);

    let (raw, status) = collect(&mut child, reader)?;

    debug!(program = %program, code = ?status.code(), bytes = raw.len(), "Subprocess finished");

    Ok(CommandOutput {
        output: String::from_utf8_lossy(&raw).into_owned(),
        code: status.code(),
    })
}

/// Reads `reader` to EOF, then waits for `child`.
///
/// The child is reaped even when reading fails.
fn collect(child: &mut Child, mut reader: impl Read) -> Result<(Vec<u8>, ExitStatus), ExecError> {
    let mut raw = Vec::new();
    let read = reader.read_to_end(&mut raw);
    // Closing the read end lets a still-writing child die of SIGPIPE.
    drop(reader);
    let status = child.wait()?;
    read?;
    Ok((raw, status))
}

/// Resolves a configured program to an executable file.
///
/// - Absolute paths are checked as-is.
/// - Relative paths containing a separator are resolved against `working_dir`
///   and made absolute, so the result stays valid once the spawned process
///   has changed into `working_dir`.
/// - Bare names are searched for on `PATH`.
///
/// Returns `None` if no executable regular file is found.
#[must_use]
pub fn resolve_binary(binary: &str, working_dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let path = Utf8Path::new(binary);

    if binary.is_empty() {
        return None;
    }

    if path.is_absolute() {
        return is_executable(path.as_std_path()).then(|| path.to_owned());
    }

    if path.components().count() > 1 {
        let candidate = std::path::absolute(working_dir.join(path)).ok()?;
        if !is_executable(&candidate) {
            return None;
        }
        return Utf8PathBuf::from_path_buf(candidate).ok();
    }

    let search_path = std::env::var_os("PATH")?;
    std::env::split_paths(&search_path)
        .map(|dir| dir.join(binary))
        .find(|candidate| is_executable(candidate))
        .and_then(|candidate| Utf8PathBuf::from_path_buf(candidate).ok())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
