#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sinistro/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod pipeline;

// Re-export stage crates
pub use sinistro_clean as clean;
pub use sinistro_data as data;
pub use sinistro_features as features;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineRun, RunSummary};

// Re-export common types
pub use sinistro_data::{Artifact, ArtifactCache, InputSource, StageOutcome};
pub use sinistro_features::ZeroWeightPolicy;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
