//! Ordered key/value metadata and its CLI codec.
//!
//! Metadata travels through three representations:
//!
//! - the CLI flag form `"k1:v1,k2:v2"` ([`Metadata::parse`]),
//! - the display form, one `"  key: value"` line per entry
//!   ([`Metadata::format`]),
//! - a JSON object for column storage (serde `Serialize`/`Deserialize`).
//!
//! The codec has no error conditions: malformed fragments degrade to
//! omission, never a failure.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An insertion-ordered mapping of string keys to string values.
///
/// Backed by a plain vector of pairs, which keeps iteration in insertion
/// order through JSON round-trips. [`insert`](Self::insert) is
/// last-write-wins: a duplicate key overwrites the existing value in
/// place without changing its position.
///
/// # Examples
///
/// ```
/// use tasklog_core::Metadata;
///
/// let metadata = Metadata::parse("priority:high,due:tomorrow");
/// assert_eq!(metadata.len(), 2);
/// assert_eq!(metadata.get("due"), Some("tomorrow"));
///
/// // Malformed fragments are dropped silently.
/// let metadata = Metadata::parse("bad, priority:high");
/// assert_eq!(metadata.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the comma-separated `key:value` CLI form.
    ///
    /// Each comma-separated fragment is split on its first `:`; key and
    /// value are trimmed of surrounding whitespace. A fragment without a
    /// colon, or whose key or value is empty after trimming, is dropped
    /// silently. Empty input yields an empty mapping, and later duplicate
    /// keys overwrite earlier values (last-write-wins).
    pub fn parse(text: &str) -> Self {
        let mut metadata = Self::new();
        for fragment in text.split(',') {
            let Some((key, value)) = fragment.split_once(':') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() || value.is_empty() {
                continue;
            }
            metadata.insert(key, value);
        }
        metadata
    }

    /// Renders each entry as `"  key: value"` on its own line, in
    /// insertion order. Returns an empty string for an empty mapping.
    pub fn format(&self) -> String {
        self.entries
            .iter()
            .map(|(key, value)| format!("  {key}: {value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Inserts a key/value pair, overwriting any existing value for the
    /// key while keeping its original position.
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    /// Looks up the value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, v)| (k, v)))
    }
}

impl<'de> Deserialize<'de> for Metadata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MetadataVisitor;

        impl<'de> Visitor<'de> for MetadataVisitor {
            type Value = Metadata;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of string keys to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Metadata, A::Error> {
                let mut metadata = Metadata::new();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    metadata.insert(&key, &value);
                }
                Ok(metadata)
            }
        }

        deserializer.deserialize_map(MetadataVisitor)
    }
}
