//! Orchestration of the three stages.
//!
//! Stages run in order and each one checks its own artifact. When a
//! downstream artifact already exists, the stages feeding it are not run at
//! all and are reported as skipped.

use crate::config::PipelineConfig;
use crate::error::Result;
use indicatif::ProgressBar;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use sinistro_clean::{CleanStage, clean_data, load_cleaned};
use sinistro_data::{
    Artifact, ArtifactCache, CombineReport, DataError, StageOutcome, combine_files,
};
use sinistro_features::{FeatureStage, load_final, process_data};
use std::path::PathBuf;
use tracing::{debug, info};

/// A configured pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// The final daily feature table
    pub frame: DataFrame,
    /// File Aggregator summary
    pub combine: CombineReport,
    /// Domain Cleaner summary
    pub clean: CleanStage,
    /// Temporal Feature Aggregator summary
    pub features: FeatureStage,
}

/// Serializable summary of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// File Aggregator summary
    pub combine: CombineReport,
    /// Domain Cleaner summary
    pub clean: CleanStage,
    /// Temporal Feature Aggregator summary
    pub features: FeatureStage,
    /// Final-table artifact
    pub output: PathBuf,
}

impl Pipeline {
    /// Create a pipeline.
    pub const fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The pipeline's configuration.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Artifact cache over the configured paths.
    pub fn cache(&self) -> ArtifactCache {
        self.config.cache()
    }

    /// Resolve the source files to combine.
    ///
    /// Configured artifacts are never treated as sources, even when they
    /// live in the input directory.
    pub fn input_files(&self) -> Result<Vec<PathBuf>> {
        let cache = self.cache();
        let artifacts: Vec<PathBuf> = Artifact::all()
            .into_iter()
            .filter_map(|a| cache.path(a).canonicalize().ok())
            .collect();

        let files = self.config.input.resolve(&self.config.extension)?;
        let count = files.len();
        let files: Vec<PathBuf> = files
            .into_iter()
            .filter(|f| !f.canonicalize().is_ok_and(|c| artifacts.contains(&c)))
            .collect();
        if files.len() < count {
            debug!(excluded = count - files.len(), "Ignoring artifacts found among sources");
        }
        if files.is_empty() {
            return Err(DataError::NoInputFiles.into());
        }
        Ok(files)
    }

    /// Run every stage that has no reusable artifact and return the final table.
    ///
    /// `progress` is advanced once per source file read.
    pub fn run(&self, progress: Option<&ProgressBar>) -> Result<PipelineRun> {
        let cache = self.cache();
        let resume = cache.resume_point();
        if let Some(artifact) = resume {
            info!(artifact = %artifact, "Resuming from existing artifact");
        }

        if resume == Some(Artifact::Final) {
            let frame = load_final(&cache)?;
            let features = FeatureStage {
                outcome: StageOutcome::Loaded,
                rows: frame.height(),
                columns: frame.width(),
                report: None,
            };
            return Ok(PipelineRun {
                frame,
                combine: CombineReport::skipped(),
                clean: CleanStage::skipped(),
                features,
            });
        }

        let (records, combine, clean) = if resume == Some(Artifact::Cleaned) {
            let records = load_cleaned(&cache)?;
            let clean = CleanStage {
                outcome: StageOutcome::Loaded,
                rows: records.len(),
                report: None,
            };
            (records, CombineReport::skipped(), clean)
        } else {
            // A reusable combined artifact makes the sources irrelevant.
            let files = if resume == Some(Artifact::Combined) {
                Vec::new()
            } else {
                self.input_files()?
            };
            let (raw, combine) =
                combine_files(&files, &cache, &self.config.combine_options(), progress)?;
            info!(outcome = %combine.outcome, rows = combine.rows, "File Aggregator done");

            let (records, clean) = clean_data(&raw, &cache)?;
            info!(outcome = %clean.outcome, rows = clean.rows, "Domain Cleaner done");
            (records, combine, clean)
        };

        let (frame, features) = process_data(&records, &cache, self.config.zero_weight_policy)?;
        info!(
            outcome = %features.outcome,
            rows = features.rows,
            columns = features.columns,
            "Temporal Feature Aggregator done"
        );

        Ok(PipelineRun {
            frame,
            combine,
            clean,
            features,
        })
    }
}

impl PipelineRun {
    /// Whether any stage had to compute its artifact.
    pub fn computed_anything(&self) -> bool {
        [self.combine.outcome, self.clean.outcome, self.features.outcome]
            .contains(&StageOutcome::Computed)
    }

    /// Serializable summary, without the table itself.
    pub fn summary(&self, output: impl Into<PathBuf>) -> RunSummary {
        RunSummary {
            combine: self.combine.clone(),
            clean: self.clean.clone(),
            features: self.features.clone(),
            output: output.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sinistro_data::InputSource;
    use std::fs;
    use tempfile::tempdir;

    const SOURCE: &str = "\
D_OCORR;INDENIZ;VAL_SALVAD;VAL_RESS;EVENTO;CAUSA;MODALIDADE;TIPO_PROD;REGIAO;SEXO
20200115;100;0;0;2;3;A;AUTO;SP;M
";

    #[test]
    fn test_artifacts_in_input_directory_are_not_sources() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("claims.csv"), SOURCE).unwrap();
        let config = PipelineConfig::new(InputSource::Directory(dir.path().to_path_buf()))
            .with_artifact_dir(dir.path());
        let pipeline = Pipeline::new(config);

        pipeline.run(None).unwrap();
        assert!(pipeline.cache().exists(Artifact::Combined));

        // The combined artifact now sits next to the source.
        let files = pipeline.input_files().unwrap();
        assert_eq!(files, vec![dir.path().join("claims.csv")]);
    }

    #[test]
    fn test_resume_from_cleaned_skips_combine() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("claims.csv");
        fs::write(&source, SOURCE).unwrap();
        let config = PipelineConfig::new(InputSource::Files(vec![source.clone()]))
            .with_artifact_dir(dir.path().join("out"));
        let pipeline = Pipeline::new(config);

        pipeline.run(None).unwrap();
        let cache = pipeline.cache();
        cache.invalidate(Artifact::Final).unwrap();
        fs::remove_file(&source).unwrap();

        let run = pipeline.run(None).unwrap();
        assert_eq!(run.combine.outcome, StageOutcome::Skipped);
        assert_eq!(run.clean.outcome, StageOutcome::Loaded);
        assert_eq!(run.features.outcome, StageOutcome::Computed);
        assert_eq!(run.frame.height(), 1);
    }

    #[test]
    fn test_summary_serializes_outcomes() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("claims.csv");
        fs::write(&source, SOURCE).unwrap();
        let config = PipelineConfig::new(InputSource::Files(vec![source]))
            .with_artifact_dir(dir.path().join("out"));

        let run = Pipeline::new(config.clone()).run(None).unwrap();
        assert!(run.computed_anything());
        let json = serde_json::to_value(run.summary(&config.final_path)).unwrap();
        assert_eq!(json["combine"]["outcome"], "computed");
        assert_eq!(json["clean"]["report"]["rows_out"], 1);
        assert_eq!(json["features"]["rows"], 1);
    }
}
