//! Domain type for a single todo row.

use chrono::NaiveDateTime;

use crate::Metadata;

/// A single task as stored in the `todos` table.
///
/// Ids are assigned by the database on creation and never reused or
/// mutated. `completed` only ever transitions from `false` to `true`
/// (there is no un-complete operation), and `metadata` is set once at
/// creation; no exposed operation updates it afterwards.
///
/// # Examples
///
/// ```
/// use tasklog_core::Todo;
///
/// let todo = Todo {
///     id: 1,
///     task: "water the plants".to_string(),
///     completed: false,
///     created_at: chrono::NaiveDateTime::default(),
///     metadata: None,
/// };
/// assert_eq!(todo.marker(), ' ');
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Todo {
    /// Unique row id, assigned by the store on creation.
    pub id: i64,
    /// Non-empty text describing the work item.
    pub task: String,
    /// Whether the task has been marked complete.
    pub completed: bool,
    /// Creation timestamp, set once by the database.
    pub created_at: NaiveDateTime,
    /// Optional key/value metadata; `None` when none was supplied.
    pub metadata: Option<Metadata>,
}

impl Todo {
    /// Returns the single-character completion marker used in listings.
    pub fn marker(&self) -> char {
        if self.completed { 'X' } else { ' ' }
    }
}
