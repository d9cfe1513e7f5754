//! Core types, errors, and configuration for the migration runner.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - Error types for configuration loading ([`ConfigError`])
//! - Configuration structures ([`Config`] and its sections)
//! - Domain types ([`MigrationFile`], [`MigrationKind`], [`StatusRecord`],
//!   [`ExecutionResult`], [`RunSummary`])
//! - The `FxHashMap` alias used for status records

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod types;

pub use config::{BinaryConfig, Config, DEFAULT_CMS_BINARY, DatabaseConfig, MigrationConfig};
pub use error::ConfigError;
pub use hash::{FxHashMap, fx_hash_map};
pub use types::{
    ExecutionResult, FailureKind, LEGACY_STATUS_NAMESPACE, MigrationFile, MigrationKind,
    RunSummary, STATUS_KEY_PREFIX, STATUS_NAMESPACE, StatusRecord, parse_version, status_key,
    unix_timestamp,
};
