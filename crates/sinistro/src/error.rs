//! Pipeline error type.

use thiserror::Error;

/// Result type for pipeline runs.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Any failure that aborts a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// File Aggregator or artifact failure
    #[error(transparent)]
    Data(#[from] sinistro_data::DataError),

    /// Domain Cleaner failure
    #[error(transparent)]
    Clean(#[from] sinistro_clean::CleanError),

    /// Temporal Feature Aggregator failure
    #[error(transparent)]
    Feature(#[from] sinistro_features::FeatureError),
}
