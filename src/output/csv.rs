//! CSV output for cached entries.
//!
//! One row is generated for each entry.
//!
//! # Columns
//!
//! - `id`: Entry id
//! - `title`: Image title
//! - `path`: Path of the cached file
//! - `sha256`: Content digest (hexadecimal)
//! - `file_exists`: Whether the file is still present on disk

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::cache::CacheEntry;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    id: i64,
    title: &'a str,
    path: String,
    sha256: &'a str,
    file_exists: bool,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    entries: &'a [CacheEntry],
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(entries: &'a [CacheEntry]) -> Self {
        Self { entries }
    }

    /// Write the CSV output to the given writer.
    ///
    /// The header row is written even when there are no entries.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv_writer.write_record(["id", "title", "path", "sha256", "file_exists"])?;

        for entry in self.entries {
            csv_writer.serialize(CsvRow {
                id: entry.id,
                title: &entry.title,
                path: entry.file_path.to_string_lossy().into_owned(),
                sha256: &entry.content_digest,
                file_exists: entry.file_path.is_file(),
            })?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
