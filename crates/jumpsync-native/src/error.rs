//! Trial-level error types
//!
//! Wraps numeric failures together with the file and parse errors of the
//! trial readers and writers.

use std::path::PathBuf;

use jumpsync_core::error::ProcessingError;
use thiserror::Error;

/// Errors from reading, processing or persisting a trial
#[derive(Error, Debug)]
pub enum TrialError {
    /// File could not be opened, read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (configuration or phase export) failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Kinematics CSV could not be read or written
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Numeric pipeline failure
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    /// A data or header line could not be parsed
    #[error("Parse error at line {line}: {reason}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        reason: String,
    },

    /// A required column is absent from the header
    #[error("Missing column '{column}' in {path}")]
    MissingColumn {
        /// Column name
        column: &'static str,
        /// File being read
        path: PathBuf,
    },
}

/// Result type for trial operations
pub type TrialResult<T> = Result<T, TrialError>;
