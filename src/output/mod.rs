//! Output formatters for cache listings.
//!
//! - Plain text for people (this module)
//! - JSON for automation and scripting
//! - CSV for spreadsheet import

pub mod csv;
pub mod json;

use std::io::{self, Write};

use crate::cache::{CacheEntry, EntryMetadata};

pub use self::csv::CsvOutput;
pub use self::json::{JsonEntry, JsonOutput};

/// Write one line per entry: right-aligned id, then title.
///
/// # Errors
///
/// Returns any error raised by the writer.
pub fn write_titles<W: Write>(writer: &mut W, entries: &[CacheEntry]) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(writer, "The image cache is empty.");
    }

    let width = entries
        .last()
        .map_or(1, |e| e.id.to_string().len());
    for entry in entries {
        writeln!(writer, "{:>width$}  {}", entry.id, entry.title, width = width)?;
    }
    Ok(())
}

/// Write the title, explanation and file path of one entry.
///
/// # Errors
///
/// Returns any error raised by the writer.
pub fn write_metadata<W: Write>(writer: &mut W, id: i64, meta: &EntryMetadata) -> io::Result<()> {
    writeln!(writer, "#{} {}", id, meta.title)?;
    writeln!(writer)?;
    writeln!(writer, "{}", meta.explanation)?;
    writeln!(writer)?;
    writeln!(writer, "File: {}", meta.file_path.display())
}
