//! Error types for cleaning operations.

use thiserror::Error;

/// Result type for cleaning operations.
pub type Result<T> = std::result::Result<T, CleanError>;

/// Errors that abort the cleaning stage.
///
/// Rows failing a domain predicate are not errors; they are dropped and
/// counted in the [`CleaningReport`](crate::CleaningReport).
#[derive(Debug, Error)]
pub enum CleanError {
    /// A required column is absent from the input
    #[error("Schema violation: required column {0} is missing")]
    MissingColumn(String),

    /// A monetary value could not be parsed as a number
    #[error("Invalid amount in column {column}: {value:?}")]
    InvalidAmount {
        /// Column holding the value
        column: &'static str,
        /// Offending text
        value: String,
    },

    /// A reloaded cleaned artifact holds a value outside the domain
    #[error("Corrupt cleaned artifact: column {column} has invalid value {value:?}")]
    CorruptArtifact {
        /// Column holding the value
        column: &'static str,
        /// Offending text
        value: String,
    },

    /// Artifact or source handling error
    #[error("Data error: {0}")]
    Data(#[from] sinistro_data::DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
