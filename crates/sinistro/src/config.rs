//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use sinistro_data::combine::DEFAULT_INNER_THREADS;
use sinistro_data::io::DEFAULT_SEPARATOR;
use sinistro_data::source::DEFAULT_EXTENSION;
use sinistro_data::{Artifact, ArtifactCache, CombineOptions, InputSource};
use sinistro_features::ZeroWeightPolicy;
use std::path::{Path, PathBuf};

/// Everything a pipeline run needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Raw claim extracts
    pub input: InputSource,
    /// Combined-table artifact
    pub combined_path: PathBuf,
    /// Cleaned-table artifact
    pub cleaned_path: PathBuf,
    /// Final-table artifact
    pub final_path: PathBuf,
    /// Field separator of sources and artifacts
    pub separator: u8,
    /// Reader pool size; `0` uses every available core
    pub jobs: usize,
    /// Cap on each reader's internal threads
    pub inner_threads: Option<usize>,
    /// Extension of files picked up from an input directory
    pub extension: String,
    /// Recompute every stage even when its artifact exists
    pub force_refresh: bool,
    /// Weighted means emitted for dates with zero total indemnity
    pub zero_weight_policy: ZeroWeightPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(InputSource::Directory(PathBuf::from(".")))
    }
}

impl PipelineConfig {
    /// Configuration reading from `input`, with artifacts in the working directory.
    pub fn new(input: InputSource) -> Self {
        Self {
            input,
            combined_path: PathBuf::from(Artifact::Combined.default_file_name()),
            cleaned_path: PathBuf::from(Artifact::Cleaned.default_file_name()),
            final_path: PathBuf::from(Artifact::Final.default_file_name()),
            separator: DEFAULT_SEPARATOR,
            jobs: 0,
            inner_threads: Some(DEFAULT_INNER_THREADS),
            extension: DEFAULT_EXTENSION.to_string(),
            force_refresh: false,
            zero_weight_policy: ZeroWeightPolicy::default(),
        }
    }

    /// Set the input source.
    pub fn with_input(mut self, input: InputSource) -> Self {
        self.input = input;
        self
    }

    /// Put all three artifacts in `dir` under their default names.
    pub fn with_artifact_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.combined_path = dir.join(Artifact::Combined.default_file_name());
        self.cleaned_path = dir.join(Artifact::Cleaned.default_file_name());
        self.final_path = dir.join(Artifact::Final.default_file_name());
        self
    }

    /// Set the combined-table artifact path.
    pub fn with_combined_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.combined_path = path.into();
        self
    }

    /// Set the cleaned-table artifact path.
    pub fn with_cleaned_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cleaned_path = path.into();
        self
    }

    /// Set the final-table artifact path.
    pub fn with_final_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.final_path = path.into();
        self
    }

    /// Set the field separator.
    pub const fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Set the reader pool size.
    pub const fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Set the cap on each reader's internal threads.
    pub const fn with_inner_threads(mut self, inner_threads: Option<usize>) -> Self {
        self.inner_threads = inner_threads;
        self
    }

    /// Set the extension used for directory discovery.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Recompute every stage even when its artifact exists.
    pub const fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }

    /// Set the zero-weight policy.
    pub const fn with_zero_weight_policy(mut self, policy: ZeroWeightPolicy) -> Self {
        self.zero_weight_policy = policy;
        self
    }

    /// Artifact cache over the configured paths.
    pub fn cache(&self) -> ArtifactCache {
        ArtifactCache::new(&self.combined_path, &self.cleaned_path, &self.final_path)
            .with_separator(self.separator)
            .with_force_refresh(self.force_refresh)
    }

    /// Options for the File Aggregator.
    pub const fn combine_options(&self) -> CombineOptions {
        CombineOptions {
            separator: self.separator,
            jobs: self.jobs,
            inner_threads: self.inner_threads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.separator, b';');
        assert_eq!(config.jobs, 0);
        assert_eq!(config.inner_threads, Some(2));
        assert_eq!(config.extension, "csv");
        assert!(!config.force_refresh);
        assert_eq!(config.zero_weight_policy, ZeroWeightPolicy::Zero);
    }

    #[rstest]
    #[case(Artifact::Combined, "combined_data.csv")]
    #[case(Artifact::Cleaned, "cleaned_data.csv")]
    #[case(Artifact::Final, "final_data.csv")]
    fn test_default_artifact_paths(#[case] artifact: Artifact, #[case] expected: &str) {
        let cache = PipelineConfig::default().cache();
        assert_eq!(cache.path(artifact), Path::new(expected));
    }

    #[rstest]
    #[case(Artifact::Combined, "out/combined_data.csv")]
    #[case(Artifact::Cleaned, "staging/cleaned.csv")]
    #[case(Artifact::Final, "tables/final.csv")]
    fn test_cache_follows_config(#[case] artifact: Artifact, #[case] expected: &str) {
        let config = PipelineConfig::default()
            .with_artifact_dir("out")
            .with_cleaned_path("staging/cleaned.csv")
            .with_final_path("tables/final.csv")
            .with_separator(b',')
            .with_force_refresh(true);
        let cache = config.cache();

        assert_eq!(cache.path(artifact), Path::new(expected));
        assert_eq!(cache.separator(), b',');
        assert!(cache.force_refresh());
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = PipelineConfig::new(InputSource::Files(vec!["a.csv".into(), "b.csv".into()]))
            .with_jobs(3)
            .with_zero_weight_policy(ZeroWeightPolicy::Exclude);

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"exclude\""));
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
