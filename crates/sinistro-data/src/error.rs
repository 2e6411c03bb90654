//! Error types for data operations.

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while reading sources or handling artifacts.
#[derive(Debug, Error)]
pub enum DataError {
    /// The input source resolved to zero files
    #[error("No input files to combine")]
    NoInputFiles,

    /// An input path does not exist
    #[error("Input path does not exist: {}", .0.display())]
    MissingInput(PathBuf),

    /// A source table could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying reader error
        source: PolarsError,
    },

    /// An artifact could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        /// Artifact destination
        path: PathBuf,
        /// Underlying writer error
        source: PolarsError,
    },

    /// Field separator is not a single ASCII character
    #[error("Invalid field separator {0:?}: must be a single ASCII character")]
    InvalidSeparator(char),

    /// Worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
