//! SQLite storage backend for the tasklog todo manager.
//!
//! Two concerns live here:
//!
//! - **`migration`** — the versioned schema runner. A fixed, ordered set
//!   of migrations with explicit sequence numbers, tracked in a
//!   `schema_migrations` record table.
//! - **`store`** — CRUD on the `todos` table, one SQL statement per
//!   operation.
//!
//! The runner materializes the schema before the store is usable; no
//! operation here auto-migrates. Concurrent `migrate latest` runs from
//! two processes are not guarded beyond SQLite's own file locking.
//!
//! # Quick start
//!
//! ```no_run
//! use tasklog_core::Metadata;
//! use tasklog_sqlite::{Migrator, TodoStore};
//! use rusqlite::Connection;
//!
//! let conn = Connection::open("tasklog.db").unwrap();
//! let mut migrator = Migrator::new(conn).unwrap();
//! migrator.latest().unwrap();
//!
//! let store = TodoStore::new(migrator.into_connection());
//! let todo = store.add("water the plants", &Metadata::new()).unwrap();
//! println!("added todo {}", todo.id);
//! ```

mod error;
mod migration;
mod store;

pub use error::{Result, StoreError};
pub use migration::{
    AppliedRecord, MIGRATIONS, Migration, MigrationRun, MigrationStatus, Migrator, StepAction,
    StepOutcome,
};
pub use store::TodoStore;
