//! Error types for feature construction.

use thiserror::Error;

/// Result type for feature operations.
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Errors that abort the temporal aggregation stage.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// A record holds a category the encoder was not fitted on
    #[error("Unknown category {value:?} for {column}")]
    UnknownCategory {
        /// Categorical column
        column: &'static str,
        /// Unseen value
        value: String,
    },

    /// A reloaded final artifact holds a value that cannot be typed
    #[error("Corrupt final artifact: column {column} has invalid value {value:?}")]
    CorruptArtifact {
        /// Column holding the value
        column: String,
        /// Offending text
        value: String,
    },

    /// Cleaned-table error
    #[error("Clean error: {0}")]
    Clean(#[from] sinistro_clean::CleanError),

    /// Artifact handling error
    #[error("Data error: {0}")]
    Data(#[from] sinistro_data::DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
