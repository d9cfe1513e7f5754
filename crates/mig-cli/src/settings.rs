//! Configuration layering for the command line.
//!
//! Values are taken from, in increasing priority:
//!
//! 1. built-in defaults
//! 2. the JSON file named by `--config` / `MIGRATE_CONFIG`
//! 3. individual flags and their environment variables

use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use color_eyre::eyre::WrapErr;
use mig_core::Config;

/// Per-field overrides of the configuration file.
#[derive(Debug, Default, Args)]
pub struct Overrides {
    /// Directory holding the migration files, relative to the public root.
    #[arg(long, global = true, env = "MIGRATE_FOLDER", value_name = "DIR")]
    pub folder: Option<Utf8PathBuf>,

    /// The application's public root; CMS commands and shell scripts run here.
    #[arg(long, global = true, env = "MIGRATE_PUBLIC_PATH", value_name = "DIR")]
    pub public_path: Option<Utf8PathBuf>,

    /// JSON file the migration status is recorded in.
    #[arg(long, global = true, env = "MIGRATE_STATUS_FILE", value_name = "FILE")]
    pub status_file: Option<Utf8PathBuf>,

    /// Database client used for `.sql` migrations.
    #[arg(long, global = true, env = "MIGRATE_MYSQL_BINARY", value_name = "PATH")]
    pub mysql_binary: Option<String>,

    /// CMS command-line binary used for command-file migrations.
    #[arg(long, global = true, env = "MIGRATE_CMS_BINARY", value_name = "PATH")]
    pub cms_binary: Option<String>,

    /// Database host.
    #[arg(long, global = true, env = "DB_HOST")]
    pub db_host: Option<String>,

    /// Database port.
    #[arg(long, global = true, env = "DB_PORT")]
    pub db_port: Option<u16>,

    /// Database user.
    #[arg(long, global = true, env = "DB_USER")]
    pub db_user: Option<String>,

    /// Database password.
    #[arg(long, global = true, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Database name.
    #[arg(long, global = true, env = "DB_NAME")]
    pub db_name: Option<String>,
}

impl Overrides {
    /// Writes every given override into `config`.
    pub fn apply(&self, config: &mut Config) {
        let migration = &mut config.migration;
        set(&mut migration.folder_path, self.folder.as_ref());
        set(&mut migration.public_path, self.public_path.as_ref());
        set(&mut migration.status_file, self.status_file.as_ref());

        let binaries = &mut config.binaries;
        set(&mut binaries.mysql, self.mysql_binary.as_ref());
        if let Some(cms) = &self.cms_binary {
            binaries.cms = Some(cms.clone());
        }

        let database = &mut config.database;
        set(&mut database.host, self.db_host.as_ref());
        set(&mut database.user, self.db_user.as_ref());
        set(&mut database.password, self.db_password.as_ref());
        set(&mut database.name, self.db_name.as_ref());
        if self.db_port.is_some() {
            database.port = self.db_port;
        }
    }
}

fn set<T: Clone>(target: &mut T, value: Option<&T>) {
    if let Some(value) = value {
        target.clone_from(value);
    }
}

/// Builds the effective configuration.
///
/// # Errors
///
/// Returns an error if the configuration file can't be read or parsed, or if
/// the result fails validation.
pub fn load_config(path: Option<&Utf8Path>, overrides: &Overrides) -> color_eyre::Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)
            .wrap_err_with(|| format!("Failed to load configuration from {path}"))?,
        None => Config::default(),
    };

    overrides.apply(&mut config);
    config.validate()?;

    tracing::debug!(?config, "Loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_overrides_keeps_defaults() {
        let config = load_config(None, &Overrides::default()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_overrides_win_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("migrate.json")).unwrap();
        std::fs::write(
            &path,
            r#"{
                "migration": { "folder_path": "db/migrations" },
                "database": { "host": "db.internal", "user": "file-user" }
            }"#,
        )
        .unwrap();

        let overrides = Overrides {
            db_user: Some("cli-user".to_owned()),
            db_port: Some(3307),
            cms_binary: Some("bin/console".to_owned()),
            ..Overrides::default()
        };
        let config = load_config(Some(&path), &overrides).unwrap();

        assert_eq!(config.migration.folder_path, "db/migrations");
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.user, "cli-user");
        assert_eq!(config.database.port, Some(3307));
        assert_eq!(config.binaries.cms_binary(), "bin/console");
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let overrides = Overrides {
            mysql_binary: Some(String::new()),
            ..Overrides::default()
        };
        let err = load_config(None, &overrides).unwrap_err();
        assert!(err.to_string().contains("binaries.mysql"));
    }

    #[test]
    fn test_missing_config_file() {
        let err = load_config(Some(Utf8Path::new("/nonexistent/migrate.json")), &Overrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/migrate.json"));
    }
}
