//! The migration orchestrator.
//!
//! A run walks through these steps:
//!
//! ```text
//! resolve folder ──► create if missing ──► relabel legacy status records
//!        │
//!        ▼
//! list entries (byte order) ──► for each regular file:
//!        applied?  ── yes ──► skip
//!        ignored?  ── yes ──► skip
//!        execute ──► success ──► record status, continue
//!                └─► failure ──► record error, halt
//! ```
//!
//! Status is written only after the executor reported success, so a crash
//! mid-file leaves the file pending and it is retried on the next run.

use camino::{Utf8Path, Utf8PathBuf};
use mig_core::{
    Config, ExecutionResult, FailureKind, LEGACY_STATUS_NAMESPACE, MigrationFile, RunSummary,
    STATUS_NAMESPACE, StatusRecord,
};
use mig_exec::{ExecContext, ExecError, MigrationExecutor};
use mig_scanner::DirectoryLister;
use tracing::{debug, info, warn};

use crate::error::RunError;
use crate::event::MigrationEvent;
use crate::plan::{PlanEntry, PlanState};
use crate::store::StatusStore;

/// Chooses and runs the executor for a migration file.
pub trait Dispatcher {
    /// Runs `file` and reports the outcome.
    fn dispatch(&self, file: &MigrationFile, ctx: &ExecContext) -> Result<ExecutionResult, ExecError>;
}

/// Dispatches on [`MigrationKind`](mig_core::MigrationKind).
#[derive(Debug, Clone, Copy, Default)]
pub struct KindDispatcher;

impl Dispatcher for KindDispatcher {
    fn dispatch(&self, file: &MigrationFile, ctx: &ExecContext) -> Result<ExecutionResult, ExecError> {
        file.kind.execute(&file.path, ctx)
    }
}

impl<F> Dispatcher for F
where
    F: Fn(&MigrationFile, &ExecContext) -> Result<ExecutionResult, ExecError>,
{
    fn dispatch(&self, file: &MigrationFile, ctx: &ExecContext) -> Result<ExecutionResult, ExecError> {
        self(file, ctx)
    }
}

/// Runs pending migrations in order and records their status.
///
/// # Examples
///
/// ```ignore
/// use mig_core::Config;
/// use mig_runner::{JsonFileStore, Migrator};
///
/// let config = Config::default();
/// let store = JsonFileStore::open(config.migration.status_file())?;
/// let mut migrator = Migrator::new(&config, store);
///
/// let summary = migrator.run()?;
/// println!("executed {} file(s)", summary.executed_count);
/// ```
#[derive(Debug)]
pub struct Migrator<S, D = KindDispatcher> {
    /// Configured folder, resolved against the public root.
    folder: Utf8PathBuf,
    /// Passed to every executor.
    ctx: ExecContext,
    store: S,
    dispatcher: D,
}

impl<S: StatusStore> Migrator<S> {
    /// Creates an orchestrator for `config` that records status in `store`.
    #[must_use]
    pub fn new(config: &Config, store: S) -> Self {
        Self {
            folder: config.migration.folder(),
            ctx: ExecContext::from_config(config),
            store,
            dispatcher: KindDispatcher,
        }
    }
}

impl<S: StatusStore, D: Dispatcher> Migrator<S, D> {
    /// Replaces the dispatcher, keeping everything else.
    #[must_use]
    pub fn with_dispatcher<E: Dispatcher>(self, dispatcher: E) -> Migrator<S, E> {
        Migrator {
            folder: self.folder,
            ctx: self.ctx,
            store: self.store,
            dispatcher,
        }
    }

    /// Returns the configured migration folder.
    #[inline]
    #[must_use]
    pub fn folder(&self) -> &Utf8Path {
        &self.folder
    }

    /// Returns the status store.
    #[inline]
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the orchestrator and returns its status store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Runs all pending migrations without reporting progress.
    ///
    /// See [`run_with`](Self::run_with).
    pub fn run(&mut self) -> Result<RunSummary, RunError> {
        self.run_with(|_| {})
    }

    /// Runs all pending migrations, reporting progress to `observer`.
    ///
    /// A failing migration does not make this return `Err`: it halts the run
    /// and shows up in the returned summary's errors.
    ///
    /// # Errors
    ///
    /// - [`RunError::MigrationFolderNotFound`] if the folder is missing and
    ///   can't be created; no file is touched in that case
    /// - [`RunError::Scan`] if the folder can't be listed
    /// - [`RunError::Store`] if a status record can't be read or written
    pub fn run_with(
        &mut self,
        mut observer: impl FnMut(&MigrationEvent<'_>),
    ) -> Result<RunSummary, RunError> {
        let folder = self.prepare_folder()?;
        observer(&MigrationEvent::FolderResolved(&folder));

        let moved = self
            .store
            .rename_namespace(LEGACY_STATUS_NAMESPACE, STATUS_NAMESPACE)?;
        if moved > 0 {
            info!(count = moved, from = LEGACY_STATUS_NAMESPACE, "Relabeled legacy status records");
        }

        let entries = DirectoryLister::new(&folder)?.list()?;
        info!(folder = %folder, entries = entries.len(), "Starting migration run");

        let mut summary = RunSummary::default();

        for entry in entries {
            if !entry.is_file() {
                continue;
            }
            let Some(file) = MigrationFile::new(entry.path) else {
                continue;
            };

            let key = file.status_key();
            if self
                .store
                .get_or(STATUS_NAMESPACE, &key, StatusRecord::default())
                .is_applied()
            {
                debug!(file = %file.filename, "Already applied, skipping");
                continue;
            }

            if !file.kind.is_executable() {
                debug!(file = %file.filename, "Not a migration, skipping");
                continue;
            }

            observer(&MigrationEvent::Started(&file));
            info!(file = %file.filename, kind = file.kind.label(), "Executing migration");

            let result = self
                .dispatcher
                .dispatch(&file, &self.ctx)
                .unwrap_or_else(|err| {
                    ExecutionResult::failure(FailureKind::Executor, String::new(), [err.to_string()])
                });
            observer(&MigrationEvent::Finished {
                file: &file,
                result: &result,
            });

            if !result.is_success() {
                warn!(file = %file.filename, errors = result.errors().len(), "Migration failed, halting run");
                summary.record_failure(file.filename, result.into_errors());
                break;
            }

            summary.record_success(file.version);
            self.store
                .set(STATUS_NAMESPACE, &key, StatusRecord::applied_now())?;
            debug!(file = %file.filename, "Recorded migration status");
        }

        info!(
            executed = summary.executed_count,
            highest_version = summary.highest_version,
            failed = !summary.is_success(),
            "Migration run finished"
        );
        Ok(summary)
    }

    /// Lists every regular file of the migration folder with its state.
    ///
    /// Nothing is executed, created or written. Records still under the
    /// legacy namespace count as applied.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Scan`] if the folder is missing or can't be listed.
    pub fn plan(&self) -> Result<Vec<PlanEntry>, RunError> {
        let entries = DirectoryLister::new(&self.folder)?.list()?;

        let plan = entries
            .into_iter()
            .filter(|entry| entry.is_file())
            .filter_map(|entry| MigrationFile::new(entry.path))
            .map(|file| {
                let state = self.state_of(&file);
                PlanEntry::new(file, state)
            })
            .collect();

        Ok(plan)
    }

    fn state_of(&self, file: &MigrationFile) -> PlanState {
        if !file.kind.is_executable() {
            return PlanState::Ignored;
        }

        let key = file.status_key();
        [STATUS_NAMESPACE, LEGACY_STATUS_NAMESPACE]
            .into_iter()
            .find_map(|ns| self.store.get(ns, &key).filter(|r| r.is_applied()))
            .map_or(PlanState::Pending, |record| PlanState::Applied {
                timestamp: record.timestamp,
            })
    }

    /// Makes sure the folder exists and returns its absolute path.
    fn prepare_folder(&self) -> Result<Utf8PathBuf, RunError> {
        if !self.folder.is_dir() {
            info!(folder = %self.folder, "Creating migration folder");
            std::fs::create_dir_all(&self.folder)
                .map_err(|err| RunError::folder_not_found(&self.folder, err))?;
        }

        self.folder
            .canonicalize_utf8()
            .map_err(|err| RunError::folder_not_found(&self.folder, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;

    use crate::error::StoreError;
    use crate::store::{JsonFileStore, MemoryStore};

    struct Fixture {
        _dir: tempfile::TempDir,
        root: Utf8PathBuf,
        config: Config,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let root = Utf8PathBuf::from_path_buf(dir.path().canonicalize().unwrap()).unwrap();
            let mut config = Config::default();
            config.migration.public_path = root.clone();
            fs::create_dir_all(root.join("migrations")).unwrap();

            Self {
                _dir: dir,
                root,
                config,
            }
        }

        fn write(&self, name: &str, contents: &str) {
            fs::write(self.root.join("migrations").join(name), contents).unwrap();
        }
    }

    /// Fails every file whose contents contain `FAIL`, and logs what ran.
    fn fake_dispatcher(
        log: &RefCell<Vec<String>>,
    ) -> impl Fn(&MigrationFile, &ExecContext) -> Result<ExecutionResult, ExecError> + '_ {
        move |file, _ctx| {
            log.borrow_mut().push(file.filename.clone());
            let contents = fs::read_to_string(&file.path).unwrap();
            if contents.contains("FAIL") {
                Ok(ExecutionResult::failure(
                    FailureKind::ErrorMarker,
                    contents,
                    [format!("ERROR 1064 in {}", file.filename)],
                ))
            } else {
                Ok(ExecutionResult::success(format!("ran {}", file.filename)))
            }
        }
    }

    #[test]
    fn test_lexicographic_order() {
        let fx = Fixture::new();
        fx.write("2_b.sql", "");
        fx.write("10_c.sql", "");
        fx.write("1_a.sql", "");

        let log = RefCell::new(Vec::new());
        let mut migrator =
            Migrator::new(&fx.config, MemoryStore::new()).with_dispatcher(fake_dispatcher(&log));
        let summary = migrator.run().unwrap();

        // Byte order, not numeric: "10_c" sorts before "1_a"
        assert_eq!(*log.borrow(), ["10_c.sql", "1_a.sql", "2_b.sql"]);
        assert_eq!(summary.executed_count, 3);
        assert_eq!(summary.highest_version, 10);
        assert!(summary.is_success());
    }

    #[test]
    fn test_second_run_is_up_to_date() {
        let fx = Fixture::new();
        fx.write("1_a.sql", "");
        fx.write("2_b.sh", "");

        let log = RefCell::new(Vec::new());
        let mut migrator =
            Migrator::new(&fx.config, MemoryStore::new()).with_dispatcher(fake_dispatcher(&log));

        assert_eq!(migrator.run().unwrap().executed_count, 2);
        let second = migrator.run().unwrap();
        assert!(second.is_up_to_date());
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_halts_on_first_failure() {
        let fx = Fixture::new();
        fx.write("1_a.sql", "");
        fx.write("2_b.sql", "FAIL");
        fx.write("3_c.sql", "");

        let log = RefCell::new(Vec::new());
        let mut migrator =
            Migrator::new(&fx.config, MemoryStore::new()).with_dispatcher(fake_dispatcher(&log));
        let summary = migrator.run().unwrap();

        assert_eq!(*log.borrow(), ["1_a.sql", "2_b.sql"]);
        assert_eq!(summary.executed_count, 1);
        assert_eq!(
            summary.failure(),
            Some(("2_b.sql", ["ERROR 1064 in 2_b.sql".to_owned()].as_slice()))
        );

        let store = migrator.store();
        assert!(store.get(STATUS_NAMESPACE, "migrationStatus:1_a.sql").is_some());
        assert!(store.get(STATUS_NAMESPACE, "migrationStatus:2_b.sql").is_none());
        assert!(store.get(STATUS_NAMESPACE, "migrationStatus:3_c.sql").is_none());
    }

    #[test]
    fn test_resume_after_fix() {
        let fx = Fixture::new();
        fx.write("1_a.sql", "");
        fx.write("2_b.sql", "FAIL");
        fx.write("3_c.sql", "");

        let log = RefCell::new(Vec::new());
        let mut migrator =
            Migrator::new(&fx.config, MemoryStore::new()).with_dispatcher(fake_dispatcher(&log));
        assert!(!migrator.run().unwrap().is_success());

        fx.write("2_b.sql", "fixed");
        log.borrow_mut().clear();
        let summary = migrator.run().unwrap();

        assert_eq!(*log.borrow(), ["2_b.sql", "3_c.sql"]);
        assert_eq!(summary.executed_count, 2);
        assert!(summary.is_success());
    }

    #[test]
    fn test_executor_error_halts_run() {
        let fx = Fixture::new();
        fx.write("1_a.sql", "");
        fx.write("2_b.sql", "");

        let mut migrator = Migrator::new(&fx.config, MemoryStore::new()).with_dispatcher(
            |_: &MigrationFile, _: &ExecContext| -> Result<ExecutionResult, ExecError> {
                Err(ExecError::binary_not_found("mysql"))
            },
        );
        let summary = migrator.run().unwrap();

        assert_eq!(summary.executed_count, 0);
        let (file, errors) = summary.failure().unwrap();
        assert_eq!(file, "1_a.sql");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("mysql"));
        assert!(migrator.store().is_empty());
    }

    /// Reads like a [`MemoryStore`] but fails every write.
    #[derive(Default)]
    struct ReadOnlyStore {
        records: MemoryStore,
    }

    impl StatusStore for ReadOnlyStore {
        fn get(&self, namespace: &str, key: &str) -> Option<StatusRecord> {
            self.records.get(namespace, key)
        }

        fn set(&mut self, _namespace: &str, _key: &str, _record: StatusRecord) -> Result<(), StoreError> {
            Err(StoreError::write(
                "/readonly/status.json",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only file system"),
            ))
        }

        fn rename_namespace(&mut self, from: &str, to: &str) -> Result<usize, StoreError> {
            self.records.rename_namespace(from, to)
        }
    }

    #[test]
    fn test_status_write_failure_aborts_run() {
        let fx = Fixture::new();
        fx.write("1_a.sql", "");
        fx.write("2_b.sql", "");

        let log = RefCell::new(Vec::new());
        let mut migrator =
            Migrator::new(&fx.config, ReadOnlyStore::default()).with_dispatcher(fake_dispatcher(&log));

        let err = migrator.run().unwrap_err();
        assert!(matches!(err, RunError::Store(StoreError::Write { .. })));
        assert_eq!(*log.borrow(), ["1_a.sql"]);
        assert!(migrator.store().get(STATUS_NAMESPACE, "migrationStatus:1_a.sql").is_none());
    }

    #[test]
    fn test_ignored_and_non_regular_entries() {
        let fx = Fixture::new();
        fx.write("1_a.sql", "");
        fx.write("README.md", "FAIL");
        fx.write("2_b.SQL", "FAIL");
        fs::create_dir(fx.root.join("migrations/3_dir.sql")).unwrap();

        let log = RefCell::new(Vec::new());
        let events = RefCell::new(Vec::new());
        let mut migrator =
            Migrator::new(&fx.config, MemoryStore::new()).with_dispatcher(fake_dispatcher(&log));
        let summary = migrator
            .run_with(|event| {
                if let Some(file) = event.file() {
                    events.borrow_mut().push(file.filename.clone());
                }
            })
            .unwrap();

        assert_eq!(*log.borrow(), ["1_a.sql"]);
        assert_eq!(*events.borrow(), ["1_a.sql", "1_a.sql"]);
        assert_eq!(summary.executed_count, 1);
        assert!(summary.is_success());
        assert_eq!(migrator.store().len(STATUS_NAMESPACE), 1);
    }

    #[test]
    fn test_events_in_order() {
        let fx = Fixture::new();
        fx.write("1_a.sql", "");

        let log = RefCell::new(Vec::new());
        let mut seen = Vec::new();
        let mut migrator =
            Migrator::new(&fx.config, MemoryStore::new()).with_dispatcher(fake_dispatcher(&log));
        migrator
            .run_with(|event| {
                seen.push(match event {
                    MigrationEvent::FolderResolved(path) => format!("folder {path}"),
                    MigrationEvent::Started(file) => format!("start {}", file.filename),
                    MigrationEvent::Finished { file, result } => {
                        format!("done {} {}", file.filename, result.output())
                    }
                });
            })
            .unwrap();

        assert_eq!(
            seen,
            [
                format!("folder {}", fx.root.join("migrations")),
                "start 1_a.sql".to_owned(),
                "done 1_a.sql ran 1_a.sql".to_owned(),
            ]
        );
    }

    #[test]
    fn test_legacy_namespace_is_relabeled_once() {
        let fx = Fixture::new();
        fx.write("1_a.sql", "");
        fx.write("2_b.sql", "");

        let mut store = MemoryStore::new();
        store.insert(
            LEGACY_STATUS_NAMESPACE,
            "migrationStatus:1_a.sql",
            StatusRecord::applied_at(42),
        );

        let log = RefCell::new(Vec::new());
        let mut migrator = Migrator::new(&fx.config, store).with_dispatcher(fake_dispatcher(&log));

        let first = migrator.run().unwrap();
        assert_eq!(*log.borrow(), ["2_b.sql"]);
        assert_eq!(first.executed_count, 1);

        let second = migrator.run().unwrap();
        assert!(second.is_up_to_date());

        let store = migrator.into_store();
        assert!(!store.contains_namespace(LEGACY_STATUS_NAMESPACE));
        assert_eq!(store.len(STATUS_NAMESPACE), 2);
        assert_eq!(
            store.get(STATUS_NAMESPACE, "migrationStatus:1_a.sql"),
            Some(StatusRecord::applied_at(42))
        );
    }

    #[test]
    fn test_missing_folder_is_created() {
        let fx = Fixture::new();
        let mut config = fx.config.clone();
        config.migration.folder_path = "db/new-migrations".into();

        let mut migrator = Migrator::new(&config, MemoryStore::new());
        let summary = migrator.run().unwrap();

        assert!(summary.is_up_to_date());
        assert!(fx.root.join("db/new-migrations").is_dir());
    }

    #[test]
    fn test_uncreatable_folder_fails_without_running() {
        let fx = Fixture::new();
        fs::write(fx.root.join("blocker"), "").unwrap();
        let mut config = fx.config.clone();
        config.migration.folder_path = "blocker/migrations".into();

        let log = RefCell::new(Vec::new());
        let mut store = MemoryStore::new();
        store.insert(LEGACY_STATUS_NAMESPACE, "migrationStatus:x", StatusRecord::applied_at(1));
        let mut migrator = Migrator::new(&config, store).with_dispatcher(fake_dispatcher(&log));

        let err = migrator.run().unwrap_err();
        assert!(matches!(err, RunError::MigrationFolderNotFound { .. }));
        assert!(log.borrow().is_empty());
        // Nothing was touched, not even the legacy records
        assert!(migrator.store().contains_namespace(LEGACY_STATUS_NAMESPACE));
    }

    #[test]
    fn test_plan_reports_states_without_running() {
        let fx = Fixture::new();
        fx.write("1_a.sql", "");
        fx.write("2_b.sql", "");
        fx.write("3_c.sql", "");
        fx.write("notes.txt", "");

        let mut store = MemoryStore::new();
        store.insert(STATUS_NAMESPACE, "migrationStatus:1_a.sql", StatusRecord::applied_at(5));
        store.insert(
            LEGACY_STATUS_NAMESPACE,
            "migrationStatus:2_b.sql",
            StatusRecord::applied_at(6),
        );

        let log = RefCell::new(Vec::new());
        let migrator = Migrator::new(&fx.config, store).with_dispatcher(fake_dispatcher(&log));
        let plan = migrator.plan().unwrap();

        let states: Vec<_> = plan
            .iter()
            .map(|entry| (entry.filename.as_str(), entry.state))
            .collect();
        assert_eq!(
            states,
            [
                ("1_a.sql", PlanState::Applied { timestamp: Some(5) }),
                ("2_b.sql", PlanState::Applied { timestamp: Some(6) }),
                ("3_c.sql", PlanState::Pending),
                ("notes.txt", PlanState::Ignored),
            ]
        );
        assert!(log.borrow().is_empty());
        assert!(migrator.store().contains_namespace(LEGACY_STATUS_NAMESPACE));
    }

    #[test]
    fn test_plan_missing_folder() {
        let fx = Fixture::new();
        let mut config = fx.config.clone();
        config.migration.folder_path = "absent".into();

        let migrator = Migrator::new(&config, MemoryStore::new());
        assert!(matches!(migrator.plan(), Err(RunError::Scan(_))));
        assert!(!fx.root.join("absent").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_real_shell_migrations_with_file_store() {
        let fx = Fixture::new();
        fx.write("1_create.sh", "echo created > marker.txt\n");
        fx.write("2_check.sh", "test -f marker.txt\n");
        let status_file = fx.config.migration.status_file();

        let store = JsonFileStore::open(status_file.clone()).unwrap();
        let mut migrator = Migrator::new(&fx.config, store);
        let summary = migrator.run().unwrap();

        assert_eq!(summary.executed_count, 2);
        assert_eq!(summary.highest_version, 2);
        assert!(fx.root.join("marker.txt").is_file());

        let reopened = JsonFileStore::open(status_file).unwrap();
        assert!(
            reopened
                .get(STATUS_NAMESPACE, "migrationStatus:2_check.sh")
                .is_some_and(StatusRecord::is_applied)
        );
    }
}
