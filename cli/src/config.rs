//! Database location configuration.
//!
//! The database is an embedded SQLite file, so connection settings
//! reduce to a single path. Resolution order: the `--db` flag, the
//! `TASKLOG_DB` environment variable, then `tasklog.db` in the working
//! directory.

use std::env;
use std::path::PathBuf;

/// Environment variable naming the database file.
pub const DB_ENV_VAR: &str = "TASKLOG_DB";

/// Default database file when neither the flag nor the environment
/// names one.
pub const DEFAULT_DB_PATH: &str = "tasklog.db";

/// Resolved database location for one invocation.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub path: PathBuf,
}

impl DbConfig {
    /// Resolves the database path from the flag, the environment, or
    /// the default, in that order.
    pub fn resolve(flag: Option<PathBuf>) -> Self {
        let path = flag
            .or_else(|| env::var_os(DB_ENV_VAR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
        Self { path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_takes_precedence() {
        let config = DbConfig::resolve(Some(PathBuf::from("/tmp/explicit.db")));
        assert_eq!(config.path, PathBuf::from("/tmp/explicit.db"));
    }

    #[test]
    fn test_env_then_default() {
        // set_var is process-global; keep both checks in one test so
        // they cannot race each other.
        unsafe { env::set_var(DB_ENV_VAR, "/tmp/from-env.db") };
        let config = DbConfig::resolve(None);
        assert_eq!(config.path, PathBuf::from("/tmp/from-env.db"));

        unsafe { env::remove_var(DB_ENV_VAR) };
        let config = DbConfig::resolve(None);
        assert_eq!(config.path, PathBuf::from(DEFAULT_DB_PATH));
    }
}
