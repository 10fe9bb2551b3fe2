//! Error types for the analysis crate.

use thiserror::Error;

/// Errors produced while ingesting or exporting measurement data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    /// Underlying file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV layer failed outright (row-level problems are skipped instead).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Neither named detection nor the positional fallback fit the file.
    #[error("could not find suitable columns — check the file structure")]
    NoColumns,

    /// The file produced no parsable measurement rows.
    #[error("no parsable measurement rows in the file")]
    NoRows,

    /// ZIP bundling failed.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
