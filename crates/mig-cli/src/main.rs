//! CLI entry point for the migration runner.
//!
//! Executes pending `*.sql`, `*.sh` and CMS command-file migrations from the
//! configured migration folder, one after another, and stops at the first
//! failure.
//!
//! # Usage
//!
//! ```bash
//! migrate [OPTIONS] [COMMAND]
//!
//! # Run all pending migrations (the default command)
//! migrate --config migrate.json
//!
//! # Show which files are applied, pending or ignored
//! migrate status --folder db/migrations
//!
//! # Machine-readable run summary
//! migrate run --format json
//! ```
//!
//! Exits with `0` when everything ran (or nothing had to) and `1` otherwise.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod report;
mod settings;

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use mig_core::Config;
use mig_runner::{JsonFileStore, Migrator, RunError};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::report::Reporter;
use crate::settings::{Overrides, load_config};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Sequential runner for SQL, CMS-command and shell migrations.
#[derive(Parser)]
#[command(name = "migrate", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute (defaults to `run`).
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON configuration file.
    #[arg(short, long, global = true, env = "MIGRATE_CONFIG", value_name = "FILE")]
    config: Option<Utf8PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Execute all pending migrations.
    Run {
        /// Output format of the summary.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List migration files and whether they have been applied.
    Status {
        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Self::Run {
            format: OutputFormat::Text,
        }
    }
}

/// Output format.
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable text.
    Text,
    /// JSON.
    Json,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber.
///
/// Respects `RUST_LOG` if set; otherwise logs at `debug` with `--verbose` and
/// `warn` by default. Logs go to stderr so stdout carries only the report.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "warn" })
    });

    let use_ansi = !no_color && std::env::var_os("NO_COLOR").is_none();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_ansi(use_ansi),
        )
        .with(filter)
        .init();
}

/// Returns `true` if the report on stdout should be colored.
fn use_color(no_color: bool) -> bool {
    !no_color && std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal()
}

const fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs all pending migrations and prints progress plus a summary.
///
/// # Errors
///
/// Returns an error if the status store fails or stdout can't be written.
fn run_migrations(config: &Config, format: OutputFormat, color: bool) -> color_eyre::Result<ExitCode> {
    info!(folder = %config.migration.folder(), "Starting migration run");

    let store = JsonFileStore::open(config.migration.status_file())?;
    let mut migrator = Migrator::new(config, store);

    let stdout = io::stdout();
    let mut reporter = Reporter::new(stdout.lock(), color);

    let result = match format {
        OutputFormat::Text => {
            let mut write_error = None;
            let result = migrator.run_with(|event| {
                if let Err(err) = reporter.event(event) {
                    write_error.get_or_insert(err);
                }
            });
            if let Some(err) = write_error {
                return Err(err.into());
            }
            result
        }
        OutputFormat::Json => migrator.run(),
    };

    match result {
        Ok(summary) => {
            match format {
                OutputFormat::Text => reporter.summary(&summary)?,
                OutputFormat::Json => reporter.json(&summary)?,
            }
            Ok(exit_code(summary.is_success()))
        }
        Err(err @ RunError::MigrationFolderNotFound { .. }) => {
            debug!(error = ?err, "Migration folder unavailable");
            match format {
                OutputFormat::Text => reporter.run_error(&err)?,
                OutputFormat::Json => reporter.run_error_json(&err)?,
            }
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}

/// Lists every file of the migration folder with its state.
///
/// # Errors
///
/// Returns an error if the folder or the status store can't be read.
fn show_status(config: &Config, format: OutputFormat, color: bool) -> color_eyre::Result<ExitCode> {
    let store = JsonFileStore::open(config.migration.status_file())?;
    let migrator = Migrator::new(config, store);
    let plan = migrator.plan()?;

    let stdout = io::stdout();
    let mut reporter = Reporter::new(stdout.lock(), color);
    match format {
        OutputFormat::Text => reporter.plan(migrator.folder().as_str(), &plan)?,
        OutputFormat::Json => reporter.json(&plan)?,
    }

    Ok(ExitCode::SUCCESS)
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.no_color);

    let config = load_config(cli.config.as_deref(), &cli.overrides)?;
    let color = use_color(cli.no_color);

    match cli.command.unwrap_or_default() {
        Commands::Run { format } => run_migrations(&config, format, color),
        Commands::Status { format } => show_status(&config, format, color),
    }
}
