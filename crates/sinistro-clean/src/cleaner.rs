//! Domain Cleaner.
//!
//! Steps run in a fixed order and each one only narrows the row set:
//! exact-duplicate removal over all original columns, projection onto the
//! required columns, then the sex, region and cause/event predicates.
//! Surviving rows keep their order from the combined table.

use crate::codes::{CauseCode, EventCode, Sex};
use crate::error::Result;
use crate::record::{CleanedRecord, category, parse_amount, records_from_frame, records_to_frame};
use crate::region::RegionCode;
use crate::schema::{INDEMNITY, RECOVERY, SALVAGE, required_positions};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use sinistro_data::{Artifact, ArtifactCache, CacheDecision, StageOutcome};
use std::collections::HashSet;
use tracing::info;

/// Row counts of one cleaning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Rows in the combined table
    pub rows_in: usize,
    /// Exact duplicates removed
    pub duplicates: usize,
    /// Rows whose sex is not `M` or `F`
    pub invalid_sex: usize,
    /// Rows whose region is not one of the 27 codes
    pub invalid_region: usize,
    /// Rows whose cause or event is outside its range
    pub invalid_code: usize,
    /// Rows kept
    pub rows_out: usize,
}

/// Summary of the cleaning stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanStage {
    /// How the cleaned table was obtained
    pub outcome: StageOutcome,
    /// Rows in the cleaned table
    pub rows: usize,
    /// Per-step counts, present when the stage was computed
    pub report: Option<CleaningReport>,
}

impl CleanStage {
    /// Summary for a stage that did not need to run.
    pub const fn skipped() -> Self {
        Self {
            outcome: StageOutcome::Skipped,
            rows: 0,
            report: None,
        }
    }
}

/// Clean the combined table, reusing the cleaned artifact when it exists.
pub fn clean_data(
    raw: &DataFrame,
    cache: &ArtifactCache,
) -> Result<(Vec<CleanedRecord>, CleanStage)> {
    if let CacheDecision::Reuse(_) = cache.decide(Artifact::Cleaned) {
        let records = load_cleaned(cache)?;
        let stage = CleanStage {
            outcome: StageOutcome::Loaded,
            rows: records.len(),
            report: None,
        };
        return Ok((records, stage));
    }

    info!(rows = raw.height(), "Cleaning data");
    let (records, report) = clean_records(raw)?;

    let mut cleaned = records_to_frame(&records)?;
    cache.store(Artifact::Cleaned, &mut cleaned)?;

    let stage = CleanStage {
        outcome: StageOutcome::Computed,
        rows: records.len(),
        report: Some(report),
    };
    Ok((records, stage))
}

/// Load the cleaned artifact as typed records.
pub fn load_cleaned(cache: &ArtifactCache) -> Result<Vec<CleanedRecord>> {
    let df = cache.load(Artifact::Cleaned)?;
    records_from_frame(&df)
}

/// Apply every cleaning step to the combined table.
///
/// A missing required column is fatal. Rows failing a predicate are dropped
/// and only counted.
pub fn clean_records(raw: &DataFrame) -> Result<(Vec<CleanedRecord>, CleaningReport)> {
    let [
        date_at,
        indemnity_at,
        salvage_at,
        recovery_at,
        event_at,
        cause_at,
        modality_at,
        product_at,
        region_at,
        sex_at,
    ] = required_positions(raw)?;

    let columns = raw
        .get_columns()
        .iter()
        .map(|c| c.cast(&DataType::String))
        .collect::<PolarsResult<Vec<Column>>>()?;
    let chunked = columns
        .iter()
        .map(|c| c.str())
        .collect::<PolarsResult<Vec<&StringChunked>>>()?;
    let text: Vec<Vec<Option<&str>>> = chunked.iter().map(|ca| ca.into_iter().collect()).collect();

    let mut report = CleaningReport {
        rows_in: raw.height(),
        ..Default::default()
    };
    let mut seen: HashSet<Vec<Option<&str>>> = HashSet::with_capacity(raw.height());
    let mut records = Vec::new();

    for i in 0..raw.height() {
        let row: Vec<Option<&str>> = text.iter().map(|column| column[i]).collect();
        if !seen.insert(row) {
            report.duplicates += 1;
            continue;
        }

        let field = |position: usize| text[position][i];

        let Some(sex) = field(sex_at).and_then(Sex::parse) else {
            report.invalid_sex += 1;
            continue;
        };
        let Some(region) = field(region_at).and_then(RegionCode::parse) else {
            report.invalid_region += 1;
            continue;
        };
        let (Some(cause), Some(event)) = (
            field(cause_at).and_then(CauseCode::parse),
            field(event_at).and_then(EventCode::parse),
        ) else {
            report.invalid_code += 1;
            continue;
        };

        records.push(CleanedRecord {
            occurrence_date: field(date_at).unwrap_or_default().to_string(),
            indemnity: parse_amount(INDEMNITY, field(indemnity_at))?,
            salvage: parse_amount(SALVAGE, field(salvage_at))?,
            recovery: parse_amount(RECOVERY, field(recovery_at))?,
            event,
            cause,
            modality: category(field(modality_at)),
            product_type: category(field(product_at)),
            region,
            sex,
        });
    }

    report.rows_out = records.len();
    info!(
        rows_in = report.rows_in,
        duplicates = report.duplicates,
        invalid_sex = report.invalid_sex,
        invalid_region = report.invalid_region,
        invalid_code = report.invalid_code,
        rows_out = report.rows_out,
        "Cleaning finished"
    );
    Ok((records, report))
}
