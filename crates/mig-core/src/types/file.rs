//! Migration file types.
//!
//! A [`MigrationFile`] is one entry of the migration folder, classified by
//! extension into a [`MigrationKind`] that selects its executor.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use super::status::status_key;

/// The executor family a migration file belongs to.
///
/// Selected purely from the file extension. Matching is case-sensitive, so
/// `UPDATE.SQL` is [`Ignored`](Self::Ignored).
///
/// # Examples
///
/// ```
/// use mig_core::MigrationKind;
///
/// assert_eq!(MigrationKind::from_extension(Some("sql")), MigrationKind::Sql);
/// assert_eq!(MigrationKind::from_extension(Some("typo3cms")), MigrationKind::Cms);
/// assert_eq!(MigrationKind::from_extension(Some("md")), MigrationKind::Ignored);
/// assert_eq!(MigrationKind::from_extension(None), MigrationKind::Ignored);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationKind {
    /// SQL script run through the database client.
    Sql,
    /// One CMS command-line invocation per line.
    Cms,
    /// Shell script run through a POSIX shell.
    Shell,
    /// Any other file. Never executed and never recorded.
    Ignored,
}

impl MigrationKind {
    /// Maps a file extension to its kind.
    #[must_use]
    pub fn from_extension(extension: Option<&str>) -> Self {
        match extension {
            Some("sql") => Self::Sql,
            Some("cms" | "typo3cms") => Self::Cms,
            Some("sh") => Self::Shell,
            _ => Self::Ignored,
        }
    }

    /// Returns `true` if files of this kind are run and recorded.
    #[inline]
    #[must_use]
    pub const fn is_executable(self) -> bool {
        !matches!(self, Self::Ignored)
    }

    /// Returns a short human-readable label.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sql => "sql",
            Self::Cms => "cms",
            Self::Shell => "shell",
            Self::Ignored => "ignored",
        }
    }
}

/// A single file in the migration folder.
///
/// Immutable once listed; it lives for one iteration of a run.
///
/// # Examples
///
/// ```
/// use mig_core::{MigrationFile, MigrationKind};
/// use camino::Utf8PathBuf;
///
/// let file = MigrationFile::new(Utf8PathBuf::from("/srv/migrations/0042_add_index.sql")).unwrap();
/// assert_eq!(file.filename, "0042_add_index.sql");
/// assert_eq!(file.kind, MigrationKind::Sql);
/// assert_eq!(file.version, 42);
/// assert_eq!(file.status_key(), "migrationStatus:0042_add_index.sql");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationFile {
    /// File name, unique within the folder.
    pub filename: String,

    /// Executor family derived from the extension.
    pub kind: MigrationKind,

    /// Leading integer of the file stem. Informational only; never used for ordering.
    pub version: u64,

    /// Full path to the file.
    pub path: Utf8PathBuf,
}

impl MigrationFile {
    /// Builds a migration file from its path.
    ///
    /// Returns `None` if the path has no file name component (for example `/`
    /// or a path ending in `..`).
    #[must_use]
    pub fn new(path: Utf8PathBuf) -> Option<Self> {
        let filename = path.file_name()?.to_owned();
        let kind = MigrationKind::from_extension(path.extension());
        let version = parse_version(&path);

        Some(Self {
            filename,
            kind,
            version,
            path,
        })
    }

    /// Returns the key under which this file's status is stored.
    #[must_use]
    pub fn status_key(&self) -> String {
        status_key(&self.filename)
    }
}

/// Parses the version number from the leading digits of a file stem.
///
/// Non-numeric stems yield `0`; values beyond `u64::MAX` saturate.
///
/// # Examples
///
/// ```
/// use mig_core::parse_version;
/// use camino::Utf8Path;
///
/// assert_eq!(parse_version(Utf8Path::new("10_users.sql")), 10);
/// assert_eq!(parse_version(Utf8Path::new("2024.sql")), 2024);
/// assert_eq!(parse_version(Utf8Path::new("readme.md")), 0);
/// ```
#[must_use]
pub fn parse_version(path: &Utf8Path) -> u64 {
    let stem = path.file_stem().unwrap_or_default();

    stem.bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_u64, |acc, digit| {
            acc.saturating_mul(10)
                .saturating_add(u64::from(digit - b'0'))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(MigrationKind::from_extension(Some("sql")), MigrationKind::Sql);
        assert_eq!(MigrationKind::from_extension(Some("cms")), MigrationKind::Cms);
        assert_eq!(
            MigrationKind::from_extension(Some("typo3cms")),
            MigrationKind::Cms
        );
        assert_eq!(MigrationKind::from_extension(Some("sh")), MigrationKind::Shell);
        assert_eq!(
            MigrationKind::from_extension(Some("SQL")),
            MigrationKind::Ignored
        );
        assert_eq!(
            MigrationKind::from_extension(Some("txt")),
            MigrationKind::Ignored
        );
        assert_eq!(MigrationKind::from_extension(None), MigrationKind::Ignored);
    }

    #[test]
    fn test_kind_is_executable() {
        assert!(MigrationKind::Sql.is_executable());
        assert!(MigrationKind::Cms.is_executable());
        assert!(MigrationKind::Shell.is_executable());
        assert!(!MigrationKind::Ignored.is_executable());
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version(Utf8Path::new("1_a.sql")), 1);
        assert_eq!(parse_version(Utf8Path::new("0007-seed.sh")), 7);
        assert_eq!(parse_version(Utf8Path::new("/abs/dir/15.typo3cms")), 15);
        assert_eq!(parse_version(Utf8Path::new("abc_1.sql")), 0);
        assert_eq!(parse_version(Utf8Path::new("")), 0);
        assert_eq!(
            parse_version(Utf8Path::new("99999999999999999999999_big.sql")),
            u64::MAX
        );
    }

    #[test]
    fn test_migration_file_new() {
        let file = MigrationFile::new(Utf8PathBuf::from("migrations/3_cleanup.sh")).unwrap();
        assert_eq!(file.filename, "3_cleanup.sh");
        assert_eq!(file.kind, MigrationKind::Shell);
        assert_eq!(file.version, 3);
        assert_eq!(file.path, Utf8PathBuf::from("migrations/3_cleanup.sh"));
    }

    #[test]
    fn test_migration_file_without_extension() {
        let file = MigrationFile::new(Utf8PathBuf::from("migrations/README")).unwrap();
        assert_eq!(file.kind, MigrationKind::Ignored);
        assert_eq!(file.version, 0);
    }

    #[test]
    fn test_migration_file_without_name() {
        assert!(MigrationFile::new(Utf8PathBuf::from("/")).is_none());
    }
}
