//! Structured error handling and exit codes.

use serde::Serialize;

use crate::apod::{DateError, FetchError};
use crate::cache::CacheError;

/// Exit codes for the apodcache application.
///
/// - 0: Success
/// - 1: General error (unexpected failure)
/// - 2: Invalid input (malformed, future or too early date)
/// - 3: Fetch failure (APOD metadata or image unobtainable)
/// - 4: Storage failure (cache directory or database unusable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the operation completed.
    Success = 0,
    /// General error: an unexpected error occurred.
    GeneralError = 1,
    /// Invalid input: the request was rejected before any I/O.
    InvalidInput = 2,
    /// Fetch failure: the remote source could not deliver.
    FetchFailure = 3,
    /// Storage failure: the cache could not be read or written.
    StorageFailure = 4,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "AC000",
            Self::GeneralError => "AC001",
            Self::InvalidInput => "AC002",
            Self::FetchFailure => "AC003",
            Self::StorageFailure => "AC004",
        }
    }

    /// Pick the exit code matching the root kind of `err`.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if cause.downcast_ref::<DateError>().is_some() {
                return Self::InvalidInput;
            }
            if cause.downcast_ref::<FetchError>().is_some() {
                return Self::FetchFailure;
            }
            if let Some(cache_err) = cause.downcast_ref::<CacheError>() {
                return match cache_err {
                    CacheError::Fetch(_) => Self::FetchFailure,
                    CacheError::NotFound(_) => Self::InvalidInput,
                    _ => Self::StorageFailure,
                };
            }
        }
        Self::GeneralError
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "AC001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
        }
    }
}
