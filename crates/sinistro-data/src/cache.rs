//! Artifact cache for the three pipeline stages.
//!
//! Each stage persists exactly one delimited-text artifact. The presence of
//! that file is the only memoization signal: no timestamps, hashes or
//! versions are compared, so a stale artifact with the expected path is
//! trusted as-is.

use crate::error::Result;
use crate::io::{DEFAULT_SEPARATOR, read_table, write_table};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The durable output of one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Artifact {
    /// Raw sources concatenated
    Combined,
    /// Validated and filtered claims
    Cleaned,
    /// Encoded, date-aggregated table
    Final,
}

impl Artifact {
    /// All artifacts in pipeline order.
    pub const fn all() -> [Self; 3] {
        [Self::Combined, Self::Cleaned, Self::Final]
    }

    /// Short name used in logs and reports.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Combined => "combined",
            Self::Cleaned => "cleaned",
            Self::Final => "final",
        }
    }

    /// File name used when no explicit path is configured.
    pub const fn default_file_name(&self) -> &'static str {
        match self {
            Self::Combined => "combined_data.csv",
            Self::Cleaned => "cleaned_data.csv",
            Self::Final => "final_data.csv",
        }
    }

    /// This artifact and every artifact derived from it.
    pub fn downstream(self) -> impl Iterator<Item = Self> {
        Self::all().into_iter().filter(move |a| *a >= self)
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Whether a stage reuses its artifact or recomputes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheDecision {
    /// Artifact exists and is trusted; load it
    Reuse(PathBuf),
    /// Artifact is absent (or refresh was forced); compute and store it
    Compute(PathBuf),
}

/// How a stage produced its output in a given run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOutcome {
    /// Output recomputed and persisted
    Computed,
    /// Output loaded from an existing artifact
    Loaded,
    /// Stage not needed because a downstream artifact was reused
    Skipped,
}

impl fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Computed => "computed",
            Self::Loaded => "loaded",
            Self::Skipped => "skipped",
        };
        write!(f, "{label}")
    }
}

/// Presence of one artifact on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactStatus {
    /// Which artifact
    pub artifact: Artifact,
    /// Where it lives
    pub path: PathBuf,
    /// Whether the file currently exists
    pub present: bool,
}

/// The three stage artifacts, keyed by their deterministic output paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactCache {
    combined: PathBuf,
    cleaned: PathBuf,
    final_table: PathBuf,
    separator: u8,
    force_refresh: bool,
}

impl Default for ArtifactCache {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl ArtifactCache {
    /// Create a cache over explicit artifact paths.
    pub fn new(
        combined: impl Into<PathBuf>,
        cleaned: impl Into<PathBuf>,
        final_table: impl Into<PathBuf>,
    ) -> Self {
        Self {
            combined: combined.into(),
            cleaned: cleaned.into(),
            final_table: final_table.into(),
            separator: DEFAULT_SEPARATOR,
            force_refresh: false,
        }
    }

    /// Create a cache using the default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(
            dir.join(Artifact::Combined.default_file_name()),
            dir.join(Artifact::Cleaned.default_file_name()),
            dir.join(Artifact::Final.default_file_name()),
        )
    }

    /// Set the field separator used for artifacts.
    pub const fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Ignore existing artifacts and recompute every stage.
    pub const fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }

    /// Field separator used for artifacts.
    pub const fn separator(&self) -> u8 {
        self.separator
    }

    /// Whether existing artifacts are ignored.
    pub const fn force_refresh(&self) -> bool {
        self.force_refresh
    }

    /// Location of an artifact.
    pub fn path(&self, artifact: Artifact) -> &Path {
        match artifact {
            Artifact::Combined => &self.combined,
            Artifact::Cleaned => &self.cleaned,
            Artifact::Final => &self.final_table,
        }
    }

    /// Whether an artifact currently exists on disk.
    pub fn exists(&self, artifact: Artifact) -> bool {
        self.path(artifact).is_file()
    }

    /// Decide whether a stage reuses its artifact or recomputes it.
    pub fn decide(&self, artifact: Artifact) -> CacheDecision {
        let path = self.path(artifact).to_path_buf();
        if !self.force_refresh && self.exists(artifact) {
            CacheDecision::Reuse(path)
        } else {
            CacheDecision::Compute(path)
        }
    }

    /// The most downstream artifact that would be reused, if any.
    ///
    /// Stages upstream of it do not need to run at all.
    pub fn resume_point(&self) -> Option<Artifact> {
        Artifact::all()
            .into_iter()
            .rev()
            .find(|a| matches!(self.decide(*a), CacheDecision::Reuse(_)))
    }

    /// Presence of every artifact.
    pub fn status(&self) -> Vec<ArtifactStatus> {
        Artifact::all()
            .into_iter()
            .map(|artifact| ArtifactStatus {
                artifact,
                path: self.path(artifact).to_path_buf(),
                present: self.exists(artifact),
            })
            .collect()
    }

    /// Load an artifact as an all-`String` table.
    pub fn load(&self, artifact: Artifact) -> Result<DataFrame> {
        let path = self.path(artifact);
        info!(artifact = %artifact, path = %path.display(), "Using existing artifact");
        read_table(path, self.separator, None)
    }

    /// Persist an artifact.
    pub fn store(&self, artifact: Artifact, df: &mut DataFrame) -> Result<()> {
        let path = self.path(artifact);
        write_table(df, path, self.separator)?;
        info!(
            artifact = %artifact,
            path = %path.display(),
            rows = df.height(),
            "Artifact saved"
        );
        Ok(())
    }

    /// Delete `from` and every artifact derived from it.
    ///
    /// Returns the paths that were actually removed.
    pub fn invalidate(&self, from: Artifact) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for artifact in from.downstream() {
            let path = self.path(artifact);
            if path.is_file() {
                fs::remove_file(path)?;
                debug!(artifact = %artifact, path = %path.display(), "Artifact removed");
                removed.push(path.to_path_buf());
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use rstest::rstest;
    use tempfile::tempdir;

    fn sample_frame() -> DataFrame {
        DataFrame::new(vec![Series::new("x".into(), vec!["1", "2"]).into()]).unwrap()
    }

    #[test]
    fn test_default_paths() {
        let cache = ArtifactCache::default();
        assert_eq!(
            cache.path(Artifact::Combined),
            Path::new("./combined_data.csv")
        );
        assert_eq!(cache.path(Artifact::Final), Path::new("./final_data.csv"));
        assert_eq!(cache.separator(), b';');
    }

    #[test]
    fn test_decide_follows_file_presence() {
        let dir = tempdir().unwrap();
        let cache = ArtifactCache::in_dir(dir.path());

        assert!(matches!(
            cache.decide(Artifact::Cleaned),
            CacheDecision::Compute(_)
        ));

        cache
            .store(Artifact::Cleaned, &mut sample_frame())
            .unwrap();
        assert_eq!(
            cache.decide(Artifact::Cleaned),
            CacheDecision::Reuse(dir.path().join("cleaned_data.csv"))
        );
        assert!(matches!(
            cache.decide(Artifact::Final),
            CacheDecision::Compute(_)
        ));
    }

    #[test]
    fn test_force_refresh_never_reuses() {
        let dir = tempdir().unwrap();
        let cache = ArtifactCache::in_dir(dir.path()).with_force_refresh(true);
        cache
            .store(Artifact::Combined, &mut sample_frame())
            .unwrap();

        assert!(cache.exists(Artifact::Combined));
        assert!(matches!(
            cache.decide(Artifact::Combined),
            CacheDecision::Compute(_)
        ));
        assert_eq!(cache.resume_point(), None);
    }

    #[test]
    fn test_resume_point_is_most_downstream() {
        let dir = tempdir().unwrap();
        let cache = ArtifactCache::in_dir(dir.path());
        assert_eq!(cache.resume_point(), None);

        cache
            .store(Artifact::Combined, &mut sample_frame())
            .unwrap();
        assert_eq!(cache.resume_point(), Some(Artifact::Combined));

        cache
            .store(Artifact::Cleaned, &mut sample_frame())
            .unwrap();
        assert_eq!(cache.resume_point(), Some(Artifact::Cleaned));
    }

    #[test]
    fn test_load_roundtrip() {
        let dir = tempdir().unwrap();
        let cache = ArtifactCache::in_dir(dir.path()).with_separator(b',');
        cache.store(Artifact::Final, &mut sample_frame()).unwrap();

        let contents = fs::read_to_string(cache.path(Artifact::Final)).unwrap();
        assert_eq!(contents, "x\n1\n2\n");

        let loaded = cache.load(Artifact::Final).unwrap();
        assert!(loaded.equals(&sample_frame()));
    }

    #[rstest]
    #[case(Artifact::Combined, 3)]
    #[case(Artifact::Cleaned, 2)]
    #[case(Artifact::Final, 1)]
    fn test_invalidate_removes_downstream(#[case] from: Artifact, #[case] expected: usize) {
        let dir = tempdir().unwrap();
        let cache = ArtifactCache::in_dir(dir.path());
        for artifact in Artifact::all() {
            cache.store(artifact, &mut sample_frame()).unwrap();
        }

        let removed = cache.invalidate(from).unwrap();
        assert_eq!(removed.len(), expected);
        for status in cache.status() {
            assert_eq!(status.present, status.artifact < from);
        }
    }
}
