//! JSON output for cached entries.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "entries": [
//!     {
//!       "id": 1,
//!       "title": "Comet",
//!       "explanation": "...",
//!       "file_path": "/home/me/.local/share/apodcache/imgcache/Comet.jpg",
//!       "sha256": "ba7816bf...",
//!       "file_exists": true
//!     }
//!   ],
//!   "total": 1
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::cache::{CacheEntry, EntryMetadata};

/// A single cache entry in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonEntry {
    /// Entry id
    pub id: i64,
    /// Image title
    pub title: String,
    /// Image explanation
    pub explanation: String,
    /// Path of the cached file
    pub file_path: String,
    /// Content digest, omitted for single-entry metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// Whether the file is still present on disk
    pub file_exists: bool,
}

impl JsonEntry {
    /// Build from a full store row.
    #[must_use]
    pub fn from_entry(entry: &CacheEntry) -> Self {
        Self {
            id: entry.id,
            title: entry.title.clone(),
            explanation: entry.explanation.clone(),
            file_path: entry.file_path.to_string_lossy().into_owned(),
            sha256: Some(entry.content_digest.clone()),
            file_exists: entry.file_path.is_file(),
        }
    }

    /// Build from the metadata of entry `id`.
    #[must_use]
    pub fn from_metadata(id: i64, meta: &EntryMetadata) -> Self {
        Self {
            id,
            title: meta.title.clone(),
            explanation: meta.explanation.clone(),
            file_path: meta.file_path.to_string_lossy().into_owned(),
            sha256: None,
            file_exists: meta.file_path.is_file(),
        }
    }
}

/// JSON document listing cache entries.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Entries in storage order
    pub entries: Vec<JsonEntry>,
    /// Number of entries
    pub total: usize,
}

impl JsonOutput {
    /// Create the JSON document for `entries`.
    #[must_use]
    pub fn new(entries: &[CacheEntry]) -> Self {
        Self {
            entries: entries.iter().map(JsonEntry::from_entry).collect(),
            total: entries.len(),
        }
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns [`JsonOutputError`] if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        write_json(writer, self)
    }
}

/// Write any serializable value as pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<(), JsonOutputError> {
    let json = serde_json::to_string_pretty(value)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Errors that can occur during JSON output generation.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// Error during JSON serialization.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing.
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
