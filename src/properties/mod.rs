//! Properties file model for propmap.
//!
//! A properties file is line-oriented: `key=value` or `key:value` entries,
//! `#` comment lines, and multi-line values signaled by a trailing `\`, `[`,
//! or `{` and terminated by a line ending in `]` or `}`. Parsing produces an
//! ordered key/value mapping; the merge consumes it and preserves its order.
//!
//! Keys are unique. A duplicate key line overwrites the value but keeps the
//! key's original position, so the first occurrence decides ordering and the
//! last occurrence decides content.

use crate::error::{PropmapError, Result};
use indexmap::IndexMap;
use std::path::Path;

mod parser;

/// Parsed properties: an insertion-ordered mapping from trimmed key to
/// finalized string value.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    entries: IndexMap<String, String>,
}

impl Properties {
    /// Load and parse a properties file from disk.
    ///
    /// # Errors
    ///
    /// Returns `PropmapError::UserError` when the file cannot be read.
    /// Parsing itself never fails: structural anomalies are absorbed into
    /// values rather than reported.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PropmapError::UserError(format!(
                "failed to read properties file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self::parse(&content))
    }

    /// Parse properties from a string.
    pub fn parse(content: &str) -> Self {
        Self {
            entries: parser::parse(content),
        }
    }

    /// Look up the finalized value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
