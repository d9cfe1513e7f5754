//! Migration orchestrator and status persistence.
//!
//! This crate drives a migration run on top of the listing in
//! `mig-scanner` and the executors in `mig-exec`:
//!
//! - [`Migrator`]: runs pending files in byte order and halts on the first failure
//! - [`StatusStore`]: where "already applied" is remembered, with
//!   [`MemoryStore`] and [`JsonFileStore`] implementations
//! - [`MigrationEvent`]: progress notifications for callers that render output
//! - [`PlanEntry`]: what a run would do, without running anything
//!
//! # Example
//!
//! ```ignore
//! use mig_core::Config;
//! use mig_runner::{JsonFileStore, MigrationEvent, Migrator};
//!
//! let config = Config::from_file("migrate.json".into())?;
//! let store = JsonFileStore::open(config.migration.status_file())?;
//! let mut migrator = Migrator::new(&config, store);
//!
//! let summary = migrator.run_with(|event| {
//!     if let MigrationEvent::Started(file) = event {
//!         println!("processing {}", file.filename);
//!     }
//! })?;
//!
//! if let Some((file, errors)) = summary.failure() {
//!     eprintln!("{file} failed: {errors:?}");
//! }
//! ```
//!
//! # Status records
//!
//! Records live under [`STATUS_NAMESPACE`](mig_core::STATUS_NAMESPACE). Records
//! written by older installations under
//! [`LEGACY_STATUS_NAMESPACE`](mig_core::LEGACY_STATUS_NAMESPACE) are moved
//! over at the start of every run, before the first lookup.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod event;
mod migrator;
mod plan;
mod store;

pub use error::{RunError, StoreError};
pub use event::MigrationEvent;
pub use migrator::{Dispatcher, KindDispatcher, Migrator};
pub use plan::{PlanEntry, PlanState};
pub use store::{JsonFileStore, MemoryStore, StatusStore};
