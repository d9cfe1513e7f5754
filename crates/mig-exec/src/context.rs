//! Everything an executor needs besides the migration file itself.

use camino::{Utf8Path, Utf8PathBuf};
use mig_core::{BinaryConfig, Config, DatabaseConfig};

/// Execution environment shared by all executors during a run.
///
/// The working directory is passed to every subprocess explicitly; the
/// runner's own working directory is never changed.
#[derive(Debug, Clone, Default)]
pub struct ExecContext {
    /// Working directory for spawned programs (the application's public root).
    pub working_dir: Utf8PathBuf,
    /// Programs used by the executors.
    pub binaries: BinaryConfig,
    /// Connection parameters for the database client.
    pub database: DatabaseConfig,
}

impl ExecContext {
    /// Builds the context from the runner configuration.
    ///
    /// A relative public root is made absolute against the current directory.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            working_dir: absolute(&config.migration.public_path),
            binaries: config.binaries.clone(),
            database: config.database.clone(),
        }
    }
}

fn absolute(path: &Utf8Path) -> Utf8PathBuf {
    if path.as_str().is_empty() || path.is_absolute() {
        return path.to_owned();
    }
    std::path::absolute(path)
        .ok()
        .and_then(|abs| Utf8PathBuf::from_path_buf(abs).ok())
        .unwrap_or_else(|| path.to_owned())
}
