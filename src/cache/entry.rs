//! Cache entry definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Sentinel id meaning "no such entry".
///
/// SQLite row ids handed out by the store start at 1, so 0 never names a row.
pub const NO_ENTRY: i64 = 0;

/// A single cached image and its metadata row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Store-assigned id, never zero and never reused
    pub id: i64,
    /// Title as supplied by the source
    pub title: String,
    /// Explanation as supplied by the source
    pub explanation: String,
    /// Absolute path of the image file under the cache root
    pub file_path: PathBuf,
    /// Hex SHA-256 of the image bytes; the dedup identity key
    pub content_digest: String,
}

impl CacheEntry {
    /// The metadata part of the entry, as handed to consumers.
    #[must_use]
    pub fn metadata(&self) -> EntryMetadata {
        EntryMetadata {
            title: self.title.clone(),
            explanation: self.explanation.clone(),
            file_path: self.file_path.clone(),
        }
    }
}

/// Title, explanation and file location of a cached image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Title of the image
    pub title: String,
    /// Explanation of the image
    pub explanation: String,
    /// Absolute path of the stored image file
    pub file_path: PathBuf,
}
