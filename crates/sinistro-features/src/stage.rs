//! Temporal Feature Aggregator stage.

use crate::encoding::fit_transform;
use crate::error::Result;
use crate::table::{daily_frame, decode_final_frame};
use crate::temporal::{AggregationReport, ZeroWeightPolicy, aggregate_by_date};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use sinistro_clean::CleanedRecord;
use sinistro_data::{Artifact, ArtifactCache, CacheDecision, StageOutcome};
use tracing::info;

/// Summary of the feature stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureStage {
    /// How the final table was obtained
    pub outcome: StageOutcome,
    /// Rows (dates) in the final table
    pub rows: usize,
    /// Columns in the final table
    pub columns: usize,
    /// Aggregation counts, present when the stage was computed
    pub report: Option<AggregationReport>,
}

/// Encode, normalize and aggregate cleaned records, reusing the final
/// artifact when it exists.
pub fn process_data(
    records: &[CleanedRecord],
    cache: &ArtifactCache,
    policy: ZeroWeightPolicy,
) -> Result<(DataFrame, FeatureStage)> {
    if let CacheDecision::Reuse(_) = cache.decide(Artifact::Final) {
        let df = load_final(cache)?;
        let stage = FeatureStage {
            outcome: StageOutcome::Loaded,
            rows: df.height(),
            columns: df.width(),
            report: None,
        };
        return Ok((df, stage));
    }

    info!(rows = records.len(), %policy, "Building daily feature table");
    let (mut df, report) = build_daily_table(records, policy)?;
    cache.store(Artifact::Final, &mut df)?;

    info!(
        dates = report.rows_out,
        indicators = report.indicator_columns,
        "Daily feature table built"
    );
    let stage = FeatureStage {
        outcome: StageOutcome::Computed,
        rows: df.height(),
        columns: df.width(),
        report: Some(report),
    };
    Ok((df, stage))
}

/// Load the final artifact with its `Date` and `Float64` columns restored.
pub fn load_final(cache: &ArtifactCache) -> Result<DataFrame> {
    let raw = cache.load(Artifact::Final)?;
    decode_final_frame(&raw)
}

/// Build the final table in memory without touching any artifact.
pub fn build_daily_table(
    records: &[CleanedRecord],
    policy: ZeroWeightPolicy,
) -> Result<(DataFrame, AggregationReport)> {
    let (encoder, encoded) = fit_transform(records)?;
    let (rows, report) = aggregate_by_date(&encoded, encoder.len(), policy);
    let df = daily_frame(encoder.columns(), &rows)?;
    Ok((df, report))
}
