//! Error types for SQLite storage operations.
//!
//! Provides a unified error type covering database access, metadata
//! column decoding, and migration failures.

use thiserror::Error;

use crate::migration::StepOutcome;

/// Errors that can occur during SQLite storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No todo row exists with the requested id.
    #[error("todo with id {0} not found")]
    NotFound(i64),

    /// Metadata column could not be serialized or deserialized.
    #[error("metadata error: {0}")]
    Metadata(#[from] serde_json::Error),

    /// A migration procedure failed mid-run.
    ///
    /// `completed` carries the outcome of every step that ran before the
    /// halt, so callers can report partial progress.
    #[error("migration '{name}' failed: {source}")]
    Migration {
        /// Name of the migration whose procedure failed.
        name: &'static str,
        /// The underlying database failure.
        #[source]
        source: rusqlite::Error,
        /// Steps completed before the failure, in execution order.
        completed: Vec<StepOutcome>,
    },

    /// The record table names a migration this binary does not define.
    #[error("applied migration '{0}' is not known to this binary")]
    UnknownMigration(String),

    /// The static migration set is malformed.
    #[error("invalid migration set: {0}")]
    InvalidMigrationSet(String),
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
