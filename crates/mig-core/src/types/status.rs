//! Persisted per-file execution status.
//!
//! This module provides [`StatusRecord`], the value the status store keeps for
//! every migration file that has been run, plus the namespace and key
//! conventions under which records are stored.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Namespace holding this runner's status records.
pub const STATUS_NAMESPACE: &str = "migrator.status";

/// Namespace older installations recorded status under.
///
/// Records found here are moved to [`STATUS_NAMESPACE`] before the first
/// lookup of a run.
pub const LEGACY_STATUS_NAMESPACE: &str = "migrator";

/// Prefix of every status key; the file name follows it.
pub const STATUS_KEY_PREFIX: &str = "migrationStatus:";

/// Builds the status key for a migration file name.
///
/// # Examples
///
/// ```
/// use mig_core::status_key;
///
/// assert_eq!(status_key("1_init.sql"), "migrationStatus:1_init.sql");
/// ```
#[must_use]
pub fn status_key(filename: &str) -> String {
    format!("{STATUS_KEY_PREFIX}{filename}")
}

/// Returns the current time as seconds since the Unix epoch.
///
/// A clock set before 1970 yields `0`.
#[must_use]
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// The stored execution status of one migration file.
///
/// A file is skipped on later runs iff its record has `success == true`.
/// Records are only written after a file ran successfully and are never
/// deleted by the runner.
///
/// # Examples
///
/// ```
/// use mig_core::StatusRecord;
///
/// let pending = StatusRecord::default();
/// assert!(!pending.is_applied());
/// assert_eq!(pending.timestamp, None);
///
/// let applied = StatusRecord::applied_at(1_700_000_000);
/// assert!(applied.is_applied());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Completion time in seconds since the Unix epoch, if the file completed.
    pub timestamp: Option<u64>,

    /// Whether the file ran successfully.
    #[serde(default)]
    pub success: bool,
}

impl StatusRecord {
    /// A successful record stamped with `timestamp`.
    #[inline]
    #[must_use]
    pub const fn applied_at(timestamp: u64) -> Self {
        Self {
            timestamp: Some(timestamp),
            success: true,
        }
    }

    /// A successful record stamped with the current time.
    #[must_use]
    pub fn applied_now() -> Self {
        Self::applied_at(unix_timestamp())
    }

    /// Returns `true` if the file has already been applied.
    #[inline]
    #[must_use]
    pub const fn is_applied(self) -> bool {
        self.success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_key() {
        assert_eq!(status_key("2_b.sql"), "migrationStatus:2_b.sql");
        assert!(status_key("x").starts_with(STATUS_KEY_PREFIX));
    }

    #[test]
    fn test_default_record_is_pending() {
        let record = StatusRecord::default();
        assert!(!record.is_applied());
        assert!(record.timestamp.is_none());
    }

    #[test]
    fn test_applied_now_has_timestamp() {
        let record = StatusRecord::applied_now();
        assert!(record.is_applied());
        assert!(record.timestamp.is_some_and(|ts| ts > 0));
    }

    #[test]
    fn test_record_serialization() {
        let json = serde_json::to_string(&StatusRecord::applied_at(42)).unwrap();
        assert_eq!(json, r#"{"timestamp":42,"success":true}"#);

        let pending: StatusRecord = serde_json::from_str(r#"{"timestamp":null}"#).unwrap();
        assert_eq!(pending, StatusRecord::default());
    }

    #[test]
    fn test_namespaces_differ() {
        assert_ne!(STATUS_NAMESPACE, LEGACY_STATUS_NAMESPACE);
    }
}
