//! Error type shared by the cache components.

use std::path::PathBuf;

use crate::apod::FetchError;

/// Errors that can occur while maintaining the image cache.
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    /// The metadata database could not be opened, read or written.
    #[error("Cache database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A filesystem operation on the cache directory failed.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No entry exists with the requested id.
    #[error("No cache entry with id {0}")]
    NotFound(i64),

    /// A row was rejected before it reached the database.
    #[error("Invalid cache entry: {0} is empty or malformed")]
    InvalidEntry(&'static str),

    /// A path cannot be stored because it is not valid UTF-8.
    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// The image or its metadata could not be obtained.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
