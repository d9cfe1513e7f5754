//! Console rendering of run progress, summaries and status listings.

use std::io::{self, Write};

use crossterm::style::{Color, Stylize, style};
use mig_core::RunSummary;
use mig_runner::{MigrationEvent, PlanEntry, PlanState, RunError};
use serde::Serialize;

/// JSON shape of a run that couldn't start.
#[derive(Serialize)]
struct RunFailure<'a> {
    error: String,
    path: Option<&'a str>,
}

/// Writes human-readable or JSON output to `out`.
pub struct Reporter<W> {
    out: W,
    color: bool,
}

impl<W: Write> Reporter<W> {
    /// Creates a reporter; `color` enables ANSI styling.
    pub const fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    /// Consumes the reporter, returning the writer.
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            style(text).with(color).to_string()
        } else {
            text.to_owned()
        }
    }

    /// Renders one progress event.
    pub fn event(&mut self, event: &MigrationEvent<'_>) -> io::Result<()> {
        match event {
            MigrationEvent::FolderResolved(path) => writeln!(self.out, "Migration path: {path}"),
            MigrationEvent::Started(file) => writeln!(self.out, "processing {}", file.filename),
            MigrationEvent::Finished { file, result } => {
                let marker = if result.is_success() {
                    self.paint("OK", Color::Green)
                } else {
                    self.paint("ERROR", Color::Red)
                };
                writeln!(self.out, "done {} {marker}", file.filename)?;

                let output = result.output().trim();
                if !output.is_empty() {
                    writeln!(self.out, "{output}")?;
                }
                Ok(())
            }
        }
    }

    /// Renders the closing summary of a run.
    pub fn summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        if summary.is_up_to_date() {
            return writeln!(self.out, "Everything up to date. No migrations needed.");
        }

        match summary.executed_count {
            0 => {
                let failed = self.paint("Migration failed", Color::Red);
                writeln!(self.out, "{failed}")?;
            }
            1 => writeln!(self.out, "Migration of 1 file completed.")?,
            n => writeln!(self.out, "Migration of {n} files completed.")?,
        }

        if !summary.errors.is_empty() {
            let heading = if summary.errors.len() == 1 {
                "The following error occurred:"
            } else {
                "The following errors occurred:"
            };
            let heading = self.paint(heading, Color::Red);
            writeln!(self.out, "{heading}")?;

            for (file, errors) in &summary.errors {
                writeln!(self.out, "File {file}:")?;
                for line in errors {
                    writeln!(self.out, "{line}")?;
                }
            }
        }
        Ok(())
    }

    /// Renders a run that couldn't start.
    pub fn run_error(&mut self, err: &RunError) -> io::Result<()> {
        let message = match err {
            RunError::MigrationFolderNotFound { path, .. } => {
                format!("Migration folder not found. Please make sure \"{path}\" exists!")
            }
            other => other.to_string(),
        };
        let message = self.paint(&message, Color::Red);
        writeln!(self.out, "{message}")
    }

    /// Renders a run that couldn't start as a JSON object.
    pub fn run_error_json(&mut self, err: &RunError) -> io::Result<()> {
        self.json(&RunFailure {
            error: err.to_string(),
            path: err.path().map(|path| path.as_str()),
        })
    }

    /// Renders the state of every file in the migration folder.
    pub fn plan(&mut self, folder: &str, entries: &[PlanEntry]) -> io::Result<()> {
        writeln!(self.out, "Migration path: {folder}")?;

        let (mut applied, mut pending, mut ignored) = (0, 0, 0);
        for entry in entries {
            let color = match entry.state {
                PlanState::Applied { .. } => {
                    applied += 1;
                    Color::Green
                }
                PlanState::Pending => {
                    pending += 1;
                    Color::Yellow
                }
                PlanState::Ignored => {
                    ignored += 1;
                    Color::DarkGrey
                }
            };
            let label = self.paint(&format!("{:<8}", entry.state.label()), color);

            match entry.state {
                PlanState::Applied {
                    timestamp: Some(ts),
                } => writeln!(self.out, "  {label} {} (at {ts})", entry.filename)?,
                _ => writeln!(self.out, "  {label} {}", entry.filename)?,
            }
        }

        writeln!(
            self.out,
            "{applied} applied, {pending} pending, {ignored} ignored"
        )
    }

    /// Writes `value` as pretty JSON followed by a newline.
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, value)?;
        writeln!(self.out)
    }
}
