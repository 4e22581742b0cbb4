//! CRUD operations on the `todos` table.
//!
//! Provides [`TodoStore`], a thin wrapper over a [`Connection`] where
//! every operation is a single SQL statement. The schema must already be
//! materialized by the migration runner; a store opened against an
//! unmigrated database reports the underlying SQL failure on first use.
//!
//! # Example
//!
//! ```no_run
//! use tasklog_core::Metadata;
//! use tasklog_sqlite::TodoStore;
//! use rusqlite::Connection;
//!
//! let conn = Connection::open("tasklog.db").unwrap();
//! let store = TodoStore::new(conn);
//!
//! let todo = store.add("water the plants", &Metadata::parse("room:kitchen")).unwrap();
//! store.complete(todo.id).unwrap();
//! store.delete(todo.id).unwrap();
//! ```

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tasklog_core::{Metadata, Todo};

use crate::error::{Result, StoreError};

/// Query and mutation interface for todo rows.
pub struct TodoStore {
    conn: Connection,
}

impl TodoStore {
    /// Wraps an open connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Inserts a new todo with `completed = false`.
    ///
    /// A non-empty metadata mapping is serialized to JSON object text;
    /// an empty mapping stores SQL NULL, never an empty-object
    /// serialization. Returns the created row, including the id and
    /// creation timestamp the database assigned.
    pub fn add(&self, task: &str, metadata: &Metadata) -> Result<Todo> {
        let metadata_json = if metadata.is_empty() {
            None
        } else {
            Some(serde_json::to_string(metadata)?)
        };
        let todo = self.conn.query_row(
            "INSERT INTO todos (task, completed, metadata) VALUES (?1, 0, ?2)
             RETURNING id, task, completed, created_at, metadata",
            params![task, metadata_json],
            row_to_todo,
        )?;
        Ok(todo)
    }

    /// Fetches all todos. Row order is whatever the database returns;
    /// none is guaranteed.
    pub fn list(&self) -> Result<Vec<Todo>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, task, completed, created_at, metadata FROM todos")?;
        let todos = stmt
            .query_map([], row_to_todo)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(todos)
    }

    /// Fetches the todo with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no row matches.
    pub fn get(&self, id: i64) -> Result<Todo> {
        self.conn
            .query_row(
                "SELECT id, task, completed, created_at, metadata FROM todos WHERE id = ?1",
                params![id],
                row_to_todo,
            )
            .optional()?
            .ok_or(StoreError::NotFound(id))
    }

    /// Marks the todo with the given id as complete.
    ///
    /// Changes only the `completed` field of the matching row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when zero rows were updated.
    pub fn complete(&self, id: i64) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE todos SET completed = 1 WHERE id = ?1",
            params![id],
        )?;
        if rows == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    /// Removes the todo with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when zero rows were removed.
    pub fn delete(&self, id: i64) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM todos WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the store and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

/// Maps a `SELECT id, task, completed, created_at, metadata` row.
fn row_to_todo(row: &Row<'_>) -> rusqlite::Result<Todo> {
    let metadata: Option<String> = row.get(4)?;
    let metadata = metadata
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    Ok(Todo {
        id: row.get(0)?,
        task: row.get(1)?,
        completed: row.get(2)?,
        created_at: row.get(3)?,
        metadata,
    })
}
