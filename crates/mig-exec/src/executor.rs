//! The common executor interface.

use camino::Utf8Path;
use mig_core::{ExecutionResult, MigrationKind};

use crate::cms::CmsExecutor;
use crate::context::ExecContext;
use crate::error::ExecError;
use crate::shell::ShellExecutor;
use crate::sql::SqlExecutor;

/// Something that can run a migration file.
pub trait MigrationExecutor {
    /// Runs the migration file at `path`.
    ///
    /// A migration that runs and fails is an `Ok` failed result; `Err` means
    /// the file couldn't be run at all.
    fn execute(&self, path: &Utf8Path, ctx: &ExecContext) -> Result<ExecutionResult, ExecError>;
}

/// Routes each kind to its executor. [`MigrationKind::Ignored`] is a no-op success.
impl MigrationExecutor for MigrationKind {
    fn execute(&self, path: &Utf8Path, ctx: &ExecContext) -> Result<ExecutionResult, ExecError> {
        match self {
            Self::Sql => SqlExecutor.execute(path, ctx),
            Self::Cms => CmsExecutor.execute(path, ctx),
            Self::Shell => ShellExecutor.execute(path, ctx),
            Self::Ignored => Ok(ExecutionResult::success(String::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn test_ignored_kind_is_a_no_op() {
        let result = MigrationKind::Ignored
            .execute(Utf8Path::new("/does/not/exist.md"), &ExecContext::default())
            .unwrap();
        assert!(result.is_success());
        assert!(result.output().is_empty());
    }

    #[test]
    fn test_kind_dispatches_to_shell() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_owned()).unwrap();
        let script = root.join("1_hello.sh");
        std::fs::write(&script, "echo dispatched\n").unwrap();

        let ctx = ExecContext {
            working_dir: root,
            ..ExecContext::default()
        };
        let result = MigrationKind::Shell.execute(&script, &ctx).unwrap();
        assert_eq!(result.output(), "dispatched");
    }

    #[test]
    fn test_kind_dispatches_to_sql() {
        let mut ctx = ExecContext::default();
        ctx.binaries.mysql = "/nonexistent/bin/mysql".to_owned();

        let result = MigrationKind::Sql.execute(Utf8Path::new("/tmp/1.sql"), &ctx);
        assert!(matches!(result, Err(ExecError::BinaryNotFound { .. })));
    }
}
