//! File Aggregator: parallel combination of raw claim extracts.
//!
//! Every source file is read by exactly one task on a bounded worker pool.
//! Tasks share nothing, so no locking is involved; the only ordering
//! guarantee needed is that results are reassembled in the listed file
//! order, which the indexed parallel collect provides regardless of which
//! worker finishes first.

use crate::cache::{Artifact, ArtifactCache, CacheDecision, StageOutcome};
use crate::error::{DataError, Result};
use crate::io::read_table;
use indicatif::ProgressBar;
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Default cap on each reader's internal threads.
pub const DEFAULT_INNER_THREADS: usize = 2;

/// Configuration for combining source files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombineOptions {
    /// Field separator of the source files
    pub separator: u8,
    /// Worker pool size; `0` uses every available core
    pub jobs: usize,
    /// Cap on each reader's internal threads, to avoid oversubscription
    pub inner_threads: Option<usize>,
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self {
            separator: crate::io::DEFAULT_SEPARATOR,
            jobs: 0,
            inner_threads: Some(DEFAULT_INNER_THREADS),
        }
    }
}

/// Summary of the combine stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombineReport {
    /// How the combined table was obtained
    pub outcome: StageOutcome,
    /// Number of source files read (zero when the artifact was reused)
    pub files: usize,
    /// Rows in the combined table
    pub rows: usize,
}

impl CombineReport {
    /// Summary for a stage that did not need to run.
    pub const fn skipped() -> Self {
        Self {
            outcome: StageOutcome::Skipped,
            files: 0,
            rows: 0,
        }
    }
}

/// Combine the source files into one raw table, reusing the combined
/// artifact when it already exists.
///
/// A single unreadable file aborts the whole stage and nothing is persisted.
pub fn combine_files(
    files: &[PathBuf],
    cache: &ArtifactCache,
    options: &CombineOptions,
    progress: Option<&ProgressBar>,
) -> Result<(DataFrame, CombineReport)> {
    if let CacheDecision::Reuse(_) = cache.decide(Artifact::Combined) {
        let combined = cache.load(Artifact::Combined)?;
        let report = CombineReport {
            outcome: StageOutcome::Loaded,
            files: 0,
            rows: combined.height(),
        };
        return Ok((combined, report));
    }

    info!(
        files = files.len(),
        jobs = options.jobs,
        "Combining source files"
    );

    let tables = read_parallel(files, options, progress)?;
    let mut combined = concat_tables(tables)?;
    cache.store(Artifact::Combined, &mut combined)?;

    let report = CombineReport {
        outcome: StageOutcome::Computed,
        files: files.len(),
        rows: combined.height(),
    };
    Ok((combined, report))
}

/// Read every file on a dedicated pool, returning tables in input order.
pub fn read_parallel(
    files: &[PathBuf],
    options: &CombineOptions,
    progress: Option<&ProgressBar>,
) -> Result<Vec<DataFrame>> {
    if files.is_empty() {
        return Err(DataError::NoInputFiles);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.jobs)
        .thread_name(|i| format!("sinistro-read-{i}"))
        .build()?;

    if let Some(pb) = progress {
        pb.set_length(files.len() as u64);
        pb.set_message(format!(
            "Reading {} files ({} workers)...",
            files.len(),
            pool.current_num_threads()
        ));
    }

    pool.install(|| {
        files
            .par_iter()
            .map(|path| -> Result<DataFrame> {
                let table = read_table(path, options.separator, options.inner_threads)?;
                debug!(path = %path.display(), rows = table.height(), "Source read");
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                Ok(table)
            })
            .collect()
    })
}

/// Concatenate tables vertically in the given order.
///
/// Column sets may differ between sources; the result carries the union of
/// all columns and cells a source does not provide are null.
pub fn concat_tables(tables: Vec<DataFrame>) -> Result<DataFrame> {
    if tables.is_empty() {
        return Err(DataError::NoInputFiles);
    }

    let frames: Vec<LazyFrame> = tables.into_iter().map(IntoLazy::lazy).collect();
    let combined = concat_lf_diagonal(frames, UnionArgs::default())?.collect()?;
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_ids(dir: &Path, name: &str, prefix: &str, rows: usize) -> PathBuf {
        let mut contents = String::from("id;value\n");
        for i in 0..rows {
            contents.push_str(&format!("{prefix}{i};{i}\n"));
        }
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn text_frame(columns: Vec<(&str, Vec<&str>)>) -> DataFrame {
        DataFrame::new(
            columns
                .into_iter()
                .map(|(name, values)| Series::new(name.into(), values).into())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_concat_preserves_listed_order() {
        let first = text_frame(vec![("id", vec!["a", "b"])]);
        let second = text_frame(vec![("id", vec!["c"])]);

        let combined = concat_tables(vec![first, second]).unwrap();
        let ids: Vec<_> = combined
            .column("id")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(ids, vec![Some("a"), Some("b"), Some("c")]);
    }

    #[test]
    fn test_concat_unions_heterogeneous_columns() {
        let first = text_frame(vec![("id", vec!["a"]), ("only_first", vec!["x"])]);
        let second = text_frame(vec![("id", vec!["b"]), ("only_second", vec!["y"])]);

        let combined = concat_tables(vec![first, second]).unwrap();
        assert_eq!(combined.height(), 2);
        assert_eq!(combined.width(), 3);

        let only_first = combined.column("only_first").unwrap().str().unwrap();
        assert_eq!(only_first.get(0), Some("x"));
        assert_eq!(only_first.get(1), None);
    }

    #[test]
    fn test_empty_inputs_rejected() {
        assert!(matches!(
            concat_tables(Vec::new()),
            Err(DataError::NoInputFiles)
        ));
        assert!(matches!(
            read_parallel(&[], &CombineOptions::default(), None),
            Err(DataError::NoInputFiles)
        ));
    }

    #[rstest]
    #[case(1, Some(1))]
    #[case(4, Some(1))]
    #[case(4, None)]
    #[case(0, Some(DEFAULT_INNER_THREADS))]
    fn test_read_parallel_keeps_listed_order(#[case] jobs: usize, #[case] inner_threads: Option<usize>) {
        let dir = tempdir().unwrap();
        // The first file is by far the slowest to read.
        let files = vec![
            write_ids(dir.path(), "big.csv", "big-", 20_000),
            write_ids(dir.path(), "small-a.csv", "a-", 2),
            write_ids(dir.path(), "small-b.csv", "b-", 1),
        ];
        let options = CombineOptions {
            jobs,
            inner_threads,
            ..Default::default()
        };
        let progress = ProgressBar::hidden();

        let tables = read_parallel(&files, &options, Some(&progress)).unwrap();
        assert_eq!(progress.position(), 3);

        let heights: Vec<usize> = tables.iter().map(DataFrame::height).collect();
        assert_eq!(heights, vec![20_000, 2, 1]);

        let combined = concat_tables(tables).unwrap();
        let ids = combined.column("id").unwrap().str().unwrap();
        assert_eq!(ids.get(0), Some("big-0"));
        assert_eq!(ids.get(19_999), Some("big-19999"));
        assert_eq!(ids.get(20_000), Some("a-0"));
        assert_eq!(ids.get(20_002), Some("b-0"));
    }
}
