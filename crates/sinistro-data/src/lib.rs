#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sinistro/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod combine;
pub mod error;
pub mod io;
pub mod source;

pub use cache::{Artifact, ArtifactCache, ArtifactStatus, CacheDecision, StageOutcome};
pub use combine::{CombineOptions, CombineReport, combine_files};
pub use error::{DataError, Result};
pub use source::InputSource;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
