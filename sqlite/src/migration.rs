//! Versioned schema migrations for the tasklog database.
//!
//! Migrations are a fixed set known at build time, each with an explicit
//! integer sequence, a name, and `up`/`down` SQL procedures. Applied
//! migrations are recorded in the `schema_migrations` table, keyed by
//! name; the pending set is whatever has no record yet.
//!
//! A record is inserted only after a migration's `up` SQL succeeds (and
//! removed only after its `down` SQL succeeds). Migration SQL is run
//! without a wrapping transaction: a procedure that fails partway may
//! leave the schema partially mutated, and the runner surfaces that as an
//! error instead of masking it.
//!
//! # Example
//!
//! ```no_run
//! use tasklog_sqlite::Migrator;
//! use rusqlite::Connection;
//!
//! let conn = Connection::open("tasklog.db").unwrap();
//! let mut migrator = Migrator::new(conn).unwrap();
//!
//! // Apply everything pending; calling again is a no-op success.
//! let run = migrator.latest().unwrap();
//! println!("applied {} migration(s)", run.steps.len());
//!
//! let status = migrator.status().unwrap();
//! assert!(status.pending.is_empty());
//! ```

use std::collections::HashSet;

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{Result, StoreError};

/// A single versioned schema change.
///
/// Ordering is carried by the explicit `sequence` field rather than a
/// naming convention, so two migrations can never be ambiguous about
/// which runs first.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// Position in the migration order; strictly ascending across the set.
    pub sequence: u32,
    /// Unique identifier, recorded in `schema_migrations` when applied.
    pub name: &'static str,
    /// SQL that transforms the schema forward one step.
    pub up: &'static str,
    /// SQL that reverses that same step.
    pub down: &'static str,
}

/// The built-in migration set, in application order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        sequence: 1,
        name: "create_todos_table",
        up: "\
CREATE TABLE todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);",
        down: "DROP TABLE todos;",
    },
    Migration {
        sequence: 2,
        name: "add_metadata_to_todos",
        up: "ALTER TABLE todos ADD COLUMN metadata TEXT;",
        down: "ALTER TABLE todos DROP COLUMN metadata;",
    },
];

/// Bookkeeping table for applied migrations. Created eagerly by
/// [`Migrator::new`] so `status` works on a fresh database.
const RECORD_TABLE_SQL: &str = "\
CREATE TABLE IF NOT EXISTS schema_migrations (
    sequence INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);";

/// What happened to one migration during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    /// The `up` procedure ran and the record was inserted.
    Applied,
    /// The `down` procedure ran and the record was removed.
    Reverted,
}

/// Outcome of one migration step in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Sequence of the migration that ran.
    pub sequence: u32,
    /// Name of the migration that ran.
    pub name: &'static str,
    /// Whether the step applied or reverted the migration.
    pub action: StepAction,
}

/// Report of a completed migration run.
///
/// An empty `steps` list means nothing was pending (or nothing was
/// applied, for `down`), which is a success, not an error.
#[derive(Debug, Clone, Default)]
pub struct MigrationRun {
    /// Steps executed, in order.
    pub steps: Vec<StepOutcome>,
}

impl MigrationRun {
    /// Returns true when the run executed no steps.
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }
}

/// One row of the `schema_migrations` record table.
#[derive(Debug, Clone)]
pub struct AppliedRecord {
    /// Recorded sequence number.
    pub sequence: u32,
    /// Recorded migration name.
    pub name: String,
    /// Timestamp the record was inserted, as stored by the database.
    pub applied_at: String,
}

/// Snapshot of applied and pending migrations.
///
/// Returned by [`Migrator::status`].
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Applied records in sequence order.
    pub applied: Vec<AppliedRecord>,
    /// Names of defined migrations with no record yet, in sequence order.
    pub pending: Vec<&'static str>,
}

/// Applies and reverts the versioned migration set.
///
/// Owns the connection for the duration of the run, like the store does;
/// use [`into_connection`](Self::into_connection) to get it back.
pub struct Migrator {
    conn: Connection,
    migrations: &'static [Migration],
}

impl Migrator {
    /// Creates a migrator over the built-in [`MIGRATIONS`] set.
    ///
    /// Validates the set and creates the `schema_migrations` record table
    /// if it does not exist yet.
    pub fn new(conn: Connection) -> Result<Self> {
        Self::with_migrations(conn, MIGRATIONS)
    }

    /// Creates a migrator over an arbitrary static migration set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidMigrationSet`] if sequences are not
    /// strictly ascending or names are not unique.
    pub fn with_migrations(conn: Connection, migrations: &'static [Migration]) -> Result<Self> {
        validate_set(migrations)?;
        conn.execute_batch(RECORD_TABLE_SQL)?;
        Ok(Self { conn, migrations })
    }

    /// Applies every pending migration in ascending sequence order.
    ///
    /// Idempotent: a run with nothing pending executes zero steps and
    /// still succeeds.
    ///
    /// # Errors
    ///
    /// Stops at the first failing migration and returns
    /// [`StoreError::Migration`] carrying the steps completed before the
    /// halt. The failed migration is not recorded as applied.
    pub fn latest(&mut self) -> Result<MigrationRun> {
        let mut completed = Vec::new();
        for migration in self.pending()? {
            if let Err(source) = self.apply_one(migration) {
                return Err(StoreError::Migration {
                    name: migration.name,
                    source,
                    completed,
                });
            }
            completed.push(StepOutcome {
                sequence: migration.sequence,
                name: migration.name,
                action: StepAction::Applied,
            });
        }
        Ok(MigrationRun { steps: completed })
    }

    /// Applies only the next pending migration, if any.
    pub fn up(&mut self) -> Result<MigrationRun> {
        let mut run = MigrationRun::default();
        if let Some(migration) = self.pending()?.first().copied() {
            if let Err(source) = self.apply_one(migration) {
                return Err(StoreError::Migration {
                    name: migration.name,
                    source,
                    completed: Vec::new(),
                });
            }
            run.steps.push(StepOutcome {
                sequence: migration.sequence,
                name: migration.name,
                action: StepAction::Applied,
            });
        }
        Ok(run)
    }

    /// Reverts the most recently applied migration, if any.
    ///
    /// The record is removed only after the `down` SQL succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownMigration`] when the record table
    /// names a migration this binary does not define.
    pub fn down(&mut self) -> Result<MigrationRun> {
        let mut run = MigrationRun::default();
        let last: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM schema_migrations ORDER BY sequence DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let Some(name) = last else {
            return Ok(run);
        };
        let migration = self
            .migrations
            .iter()
            .find(|m| m.name == name)
            .ok_or(StoreError::UnknownMigration(name))?;
        if let Err(source) = self.revert_one(migration) {
            return Err(StoreError::Migration {
                name: migration.name,
                source,
                completed: Vec::new(),
            });
        }
        run.steps.push(StepOutcome {
            sequence: migration.sequence,
            name: migration.name,
            action: StepAction::Reverted,
        });
        Ok(run)
    }

    /// Returns the applied records and the names still pending.
    pub fn status(&self) -> Result<MigrationStatus> {
        let mut stmt = self.conn.prepare(
            "SELECT sequence, name, applied_at FROM schema_migrations ORDER BY sequence",
        )?;
        let applied: Vec<AppliedRecord> = stmt
            .query_map([], |row| {
                Ok(AppliedRecord {
                    sequence: row.get(0)?,
                    name: row.get(1)?,
                    applied_at: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;

        let applied_names: HashSet<&str> = applied.iter().map(|r| r.name.as_str()).collect();
        let pending = self
            .migrations
            .iter()
            .filter(|m| !applied_names.contains(m.name))
            .map(|m| m.name)
            .collect();

        Ok(MigrationStatus { applied, pending })
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the migrator and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Defined migrations with no record yet, in sequence order.
    fn pending(&self) -> Result<Vec<&'static Migration>> {
        let mut stmt = self.conn.prepare("SELECT name FROM schema_migrations")?;
        let applied: HashSet<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        Ok(self
            .migrations
            .iter()
            .filter(|m| !applied.contains(m.name))
            .collect())
    }

    /// Runs a migration's `up` SQL, then inserts its record.
    fn apply_one(&self, migration: &Migration) -> rusqlite::Result<()> {
        self.conn.execute_batch(migration.up)?;
        self.conn.execute(
            "INSERT INTO schema_migrations (sequence, name) VALUES (?1, ?2)",
            params![migration.sequence, migration.name],
        )?;
        Ok(())
    }

    /// Runs a migration's `down` SQL, then removes its record.
    fn revert_one(&self, migration: &Migration) -> rusqlite::Result<()> {
        self.conn.execute_batch(migration.down)?;
        self.conn.execute(
            "DELETE FROM schema_migrations WHERE name = ?1",
            params![migration.name],
        )?;
        Ok(())
    }
}

/// Checks that sequences are strictly ascending and names unique.
fn validate_set(migrations: &[Migration]) -> Result<()> {
    let mut last = 0u32;
    let mut names = HashSet::new();
    for migration in migrations {
        if migration.sequence <= last {
            return Err(StoreError::InvalidMigrationSet(format!(
                "sequence {} of '{}' is not strictly ascending",
                migration.sequence, migration.name
            )));
        }
        if !names.insert(migration.name) {
            return Err(StoreError::InvalidMigrationSet(format!(
                "duplicate migration name '{}'",
                migration.name
            )));
        }
        last = migration.sequence;
    }
    Ok(())
}
