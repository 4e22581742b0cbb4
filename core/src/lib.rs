//! Core domain types for the tasklog todo manager.
//!
//! This crate defines the types shared between the storage backend and the
//! CLI:
//!
//! - [`Todo`] — a single task row with id, completion state, creation
//!   timestamp, and optional metadata.
//! - [`Metadata`] — an ordered string-to-string mapping with the
//!   comma-separated `key:value` CLI codec and a JSON-object serde
//!   round-trip for column storage.
//!
//! # Example
//!
//! ```
//! use tasklog_core::Metadata;
//!
//! let metadata = Metadata::parse("priority:high, due:tomorrow");
//! assert_eq!(metadata.get("priority"), Some("high"));
//! assert_eq!(metadata.format(), "  priority: high\n  due: tomorrow");
//! ```

mod metadata;
mod types;

pub use metadata::Metadata;
pub use types::Todo;
