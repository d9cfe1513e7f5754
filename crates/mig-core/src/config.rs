//! Configuration structures for the migration runner.
//!
//! This module provides configuration types for all components of the runner:
//!
//! - [`MigrationConfig`] - Where migrations live and where status is recorded
//! - [`BinaryConfig`] - External programs used by the executors
//! - [`DatabaseConfig`] - Connection parameters handed to the database client
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`], so a partial JSON file only
//! needs to name the values that differ from the defaults.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// CMS command-line binary used when none is configured.
pub const DEFAULT_CMS_BINARY: &str = "./vendor/bin/typo3cms";

/// Location of migration files and of the persisted status records.
///
/// Relative paths are resolved against [`public_path`](Self::public_path).
///
/// # Examples
///
/// ```
/// use mig_core::MigrationConfig;
///
/// let config = MigrationConfig::default();
/// assert_eq!(config.folder_path, "migrations");
/// assert_eq!(config.public_path, ".");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Directory holding the migration files.
    pub folder_path: Utf8PathBuf,

    /// The application's public root.
    ///
    /// CMS commands and shell scripts run with this as their working directory.
    pub public_path: Utf8PathBuf,

    /// JSON file the status store persists to.
    pub status_file: Utf8PathBuf,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            folder_path: Utf8PathBuf::from("migrations"),
            public_path: Utf8PathBuf::from("."),
            status_file: Utf8PathBuf::from(".migration-status.json"),
        }
    }
}

impl MigrationConfig {
    /// Resolves `path` against the public root unless it is already absolute.
    ///
    /// # Examples
    ///
    /// ```
    /// use mig_core::MigrationConfig;
    /// use camino::Utf8Path;
    ///
    /// let mut config = MigrationConfig::default();
    /// config.public_path = "/srv/app/public".into();
    ///
    /// assert_eq!(config.resolve(Utf8Path::new("migrations")), "/srv/app/public/migrations");
    /// assert_eq!(config.resolve(Utf8Path::new("/tmp/m")), "/tmp/m");
    /// ```
    #[must_use]
    pub fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_owned()
        } else {
            self.public_path.join(path)
        }
    }

    /// Returns the migration folder resolved against the public root.
    #[must_use]
    pub fn folder(&self) -> Utf8PathBuf {
        self.resolve(&self.folder_path)
    }

    /// Returns the status file resolved against the public root.
    #[must_use]
    pub fn status_file(&self) -> Utf8PathBuf {
        self.resolve(&self.status_file)
    }
}

/// External programs invoked by the executors.
///
/// # Examples
///
/// ```
/// use mig_core::{BinaryConfig, DEFAULT_CMS_BINARY};
///
/// let config = BinaryConfig::default();
/// assert_eq!(config.mysql, "mysql");
/// assert_eq!(config.cms_binary(), DEFAULT_CMS_BINARY);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryConfig {
    /// Database client used for `.sql` migrations.
    ///
    /// Either an absolute path or a program name looked up on `PATH`.
    pub mysql: String,

    /// CMS command-line binary used for command-file migrations.
    pub cms: Option<String>,

    /// POSIX shell used for `.sh` migrations.
    pub shell: String,
}

impl Default for BinaryConfig {
    fn default() -> Self {
        Self {
            mysql: "mysql".to_owned(),
            cms: None,
            shell: "sh".to_owned(),
        }
    }
}

impl BinaryConfig {
    /// Returns the configured CMS binary, falling back to [`DEFAULT_CMS_BINARY`].
    ///
    /// An empty string counts as "not configured".
    #[must_use]
    pub fn cms_binary(&self) -> &str {
        self.cms
            .as_deref()
            .filter(|cms| !cms.trim().is_empty())
            .unwrap_or(DEFAULT_CMS_BINARY)
    }
}

/// Connection parameters for the database client.
///
/// The password is never printed by the [`Debug`] implementation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database host name.
    pub host: String,
    /// Optional TCP port.
    pub port: Option<u16>,
    /// User name.
    pub user: String,
    /// Password, passed to the client through its environment.
    pub password: String,
    /// Database (schema) name.
    pub name: String,
    /// Client character set.
    pub charset: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: None,
            user: String::new(),
            password: String::new(),
            name: String::new(),
            charset: "utf8".to_owned(),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("charset", &self.charset)
            .finish()
    }
}

/// Root configuration for the migration runner.
///
/// # Examples
///
/// ```
/// use mig_core::Config;
///
/// let config = Config::default();
/// assert!(config.validate().is_ok());
///
/// let json = serde_json::to_string_pretty(&config).unwrap();
/// assert!(json.contains("folder_path"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Migration folder and status file settings.
    pub migration: MigrationConfig,

    /// External program settings.
    pub binaries: BinaryConfig,

    /// Database connection settings.
    pub database: DatabaseConfig,
}

impl Config {
    /// Loads a configuration from a JSON file.
    ///
    /// Missing sections and fields take their default values.
    pub fn from_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Checks the options every run depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.migration.folder_path.as_str().trim().is_empty() {
            return Err(ConfigError::invalid_option(
                "migration.folder_path",
                "must not be empty",
            ));
        }
        if self.binaries.mysql.trim().is_empty() {
            return Err(ConfigError::invalid_option(
                "binaries.mysql",
                "must not be empty",
            ));
        }
        if self.binaries.shell.trim().is_empty() {
            return Err(ConfigError::invalid_option(
                "binaries.shell",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_config_defaults() {
        let config = MigrationConfig::default();
        assert_eq!(config.folder_path, "migrations");
        assert_eq!(config.public_path, ".");
        assert_eq!(config.status_file, ".migration-status.json");
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let config = MigrationConfig {
            public_path: Utf8PathBuf::from("/srv/www"),
            ..MigrationConfig::default()
        };
        assert_eq!(config.folder(), Utf8PathBuf::from("/srv/www/migrations"));
        assert_eq!(
            config.status_file(),
            Utf8PathBuf::from("/srv/www/.migration-status.json")
        );
        assert_eq!(
            config.resolve(Utf8Path::new("/var/migrations")),
            Utf8PathBuf::from("/var/migrations")
        );
    }

    #[test]
    fn test_cms_binary_fallback() {
        let mut binaries = BinaryConfig::default();
        assert_eq!(binaries.cms_binary(), DEFAULT_CMS_BINARY);

        binaries.cms = Some("  ".to_owned());
        assert_eq!(binaries.cms_binary(), DEFAULT_CMS_BINARY);

        binaries.cms = Some("/usr/local/bin/cms".to_owned());
        assert_eq!(binaries.cms_binary(), "/usr/local/bin/cms");
    }

    #[test]
    fn test_database_debug_redacts_password() {
        let database = DatabaseConfig {
            password: "hunter2".to_owned(),
            ..DatabaseConfig::default()
        };
        let debug = format!("{database:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"migration": {"folder_path": "db/changes"}, "database": {"name": "app"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.migration.folder_path, "db/changes");
        assert_eq!(config.migration.public_path, ".");
        assert_eq!(config.database.name, "app");
        assert_eq!(config.database.charset, "utf8");
        assert_eq!(config.binaries.mysql, "mysql");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("migrator.json")).unwrap();
        std::fs::write(&path, r#"{"binaries": {"cms": "bin/cms"}}"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.binaries.cms_binary(), "bin/cms");
    }

    #[test]
    fn test_from_file_missing() {
        let result = Config::from_file(Utf8Path::new("/nonexistent/migrator.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_from_file_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("migrator.json")).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(Config::from_file(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validate_rejects_empty_options() {
        let mut config = Config::default();
        config.migration.folder_path = Utf8PathBuf::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOption { ref option, .. }) if option == "migration.folder_path"
        ));

        let mut config = Config::default();
        config.binaries.mysql = String::new();
        assert!(config.validate().is_err());
    }
}
