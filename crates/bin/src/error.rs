//! CLI error type.

use thiserror::Error;

/// Failures reported by the CLI before exiting with status 1.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Pipeline failure
    #[error(transparent)]
    Pipeline(#[from] sinistro::PipelineError),

    /// Artifact handling failure
    #[error(transparent)]
    Data(#[from] sinistro::data::DataError),

    /// Summary serialization failure
    #[error("Failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid progress bar template
    #[error("Progress bar template: {0}")]
    Progress(#[from] indicatif::style::TemplateError),
}
