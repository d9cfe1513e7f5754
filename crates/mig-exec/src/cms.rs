//! CMS command-file executor.
//!
//! A command file holds one CMS command-line invocation per line:
//!
//! ```text
//! # flush caches before the schema update
//! cache:flush
//! database:updateschema "*.add,*.change"
//! // comments may also start with two slashes
//! ```
//!
//! Each non-blank, non-comment line is split into arguments and appended to
//! the configured CMS binary. Lines run in file order and the first non-zero
//! exit stops the file.

use std::process::{Command, Stdio};

use camino::Utf8Path;
use mig_core::{ExecutionResult, FailureKind};
use tracing::{debug, warn};

use crate::context::ExecContext;
use crate::error::ExecError;
use crate::executor::MigrationExecutor;
use crate::subprocess::{in_dir, resolve_binary, run_command};

/// Runs CMS command-file migrations.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmsExecutor;

impl MigrationExecutor for CmsExecutor {
    /// Executes every command line of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::FileUnreadable`] if the file can't be read,
    /// [`ExecError::InvalidCommandLine`] for a line with unbalanced quoting,
    /// and [`ExecError::BinaryNotFound`] if the CMS binary can't be resolved.
    /// A file without command lines succeeds without looking for the binary.
    fn execute(&self, path: &Utf8Path, ctx: &ExecContext) -> Result<ExecutionResult, ExecError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| ExecError::file_unreadable(path, source))?;
        let lines: Vec<&str> = command_lines(&contents).collect();
        if lines.is_empty() {
            return Ok(ExecutionResult::success(String::new()));
        }

        let binary = ctx.binaries.cms_binary();
        let program = resolve_binary(binary, &ctx.working_dir)
            .ok_or_else(|| ExecError::binary_not_found(binary))?;

        let mut output = String::new();
        for line in lines {
            let args = split_command_line(line)?;

            let mut command = Command::new(&program);
            command.args(&args);
            in_dir(&mut command, &ctx.working_dir);

            debug!(file = %path, command = line, "Running CMS command");
            let result = run_command(command, Stdio::null())?;

            if !output.is_empty() && !result.output.is_empty() {
                output.push('\n');
            }
            output.push_str(result.output.trim_end());

            if !result.success() {
                warn!(file = %path, command = line, code = ?result.code, "CMS command failed");
                // The accumulated output becomes the error text.
                return Ok(ExecutionResult::failure(
                    FailureKind::NonZeroExit(result.code),
                    output,
                    Vec::new(),
                ));
            }
        }

        Ok(ExecutionResult::success(output))
    }
}

/// Yields the trimmed lines that should be executed.
///
/// Blank lines and lines starting with `#` or `//` are skipped.
pub fn command_lines(contents: &str) -> impl Iterator<Item = &str> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with("//"))
}

/// Splits a command line into arguments.
///
/// Supports single quotes (literal), double quotes (where `\` escapes `"`,
/// `\`, `$` and `` ` ``) and backslash escapes outside quotes. Nothing is
/// expanded; variables and globs are passed through verbatim.
///
/// # Errors
///
/// Returns [`ExecError::InvalidCommandLine`] on an unterminated quote or a
/// trailing backslash.
///
/// # Examples
///
/// ```
/// use mig_exec::split_command_line;
///
/// let args = split_command_line(r#"database:updateschema "*.add,*.change" --verbose"#).unwrap();
/// assert_eq!(args, ["database:updateschema", "*.add,*.change", "--verbose"]);
/// ```
pub fn split_command_line(line: &str) -> Result<Vec<String>, ExecError> {
    let invalid = |reason| ExecError::InvalidCommandLine {
        line: line.to_owned(),
        reason,
    };

    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(invalid("unterminated single quote")),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\' | '$' | '`')) => current.push(c),
                            Some(c) => {
                                current.push('\\');
                                current.push(c);
                            }
                            None => return Err(invalid("unterminated double quote")),
                        },
                        Some(c) => current.push(c),
                        None => return Err(invalid("unterminated double quote")),
                    }
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(c) => current.push(c),
                    None => return Err(invalid("trailing backslash")),
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        args.push(current);
    }

    Ok(args)
}
