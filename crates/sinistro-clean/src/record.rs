//! Typed cleaned claim records and their table form.

use crate::codes::{CauseCode, EventCode, Sex};
use crate::error::{CleanError, Result};
use crate::region::RegionCode;
use crate::schema::{
    CAUSE, EVENT, INDEMNITY, MISSING_CATEGORY, MODALITY, OCCURRENCE_DATE, PRODUCT_TYPE, RECOVERY,
    REGION, REQUIRED_COLUMNS, SALVAGE, SEX,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// A claim that passed every domain predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    /// Occurrence date as found in the source (validated later, at aggregation)
    pub occurrence_date: String,
    /// Indemnity paid
    pub indemnity: f64,
    /// Salvage value
    pub salvage: f64,
    /// Recovery value
    pub recovery: f64,
    /// Event code
    pub event: EventCode,
    /// Cause code
    pub cause: CauseCode,
    /// Policy modality
    pub modality: String,
    /// Product type
    pub product_type: String,
    /// Normalized region
    pub region: RegionCode,
    /// Sex of the insured
    pub sex: Sex,
}

/// Parse a monetary value.
///
/// Missing or blank values count as zero. A comma is accepted as decimal
/// separator when the value has no dot. Any other non-numeric text is fatal.
pub fn parse_amount(column: &'static str, raw: Option<&str>) -> Result<f64> {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(0.0);
    };

    let parsed = if value.contains(',') && !value.contains('.') {
        value.replacen(',', ".", 1).parse::<f64>()
    } else {
        value.parse::<f64>()
    };

    parsed
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| CleanError::InvalidAmount {
            column,
            value: value.to_string(),
        })
}

/// Free-form category value, with a placeholder for missing cells.
pub(crate) fn category(raw: Option<&str>) -> String {
    raw.unwrap_or(MISSING_CATEGORY).to_string()
}

/// Build the cleaned table from typed records.
pub fn records_to_frame(records: &[CleanedRecord]) -> Result<DataFrame> {
    let dates: Vec<&str> = records.iter().map(|r| r.occurrence_date.as_str()).collect();
    let indemnity: Vec<f64> = records.iter().map(|r| r.indemnity).collect();
    let salvage: Vec<f64> = records.iter().map(|r| r.salvage).collect();
    let recovery: Vec<f64> = records.iter().map(|r| r.recovery).collect();
    let events: Vec<String> = records.iter().map(|r| r.event.to_string()).collect();
    let causes: Vec<String> = records.iter().map(|r| r.cause.to_string()).collect();
    let modalities: Vec<&str> = records.iter().map(|r| r.modality.as_str()).collect();
    let products: Vec<&str> = records.iter().map(|r| r.product_type.as_str()).collect();
    let regions: Vec<i32> = records.iter().map(|r| i32::from(r.region.code())).collect();
    let sexes: Vec<&str> = records.iter().map(|r| r.sex.as_str()).collect();

    let df = DataFrame::new(vec![
        Series::new(OCCURRENCE_DATE.into(), dates).into(),
        Series::new(INDEMNITY.into(), indemnity).into(),
        Series::new(SALVAGE.into(), salvage).into(),
        Series::new(RECOVERY.into(), recovery).into(),
        Series::new(EVENT.into(), events).into(),
        Series::new(CAUSE.into(), causes).into(),
        Series::new(MODALITY.into(), modalities).into(),
        Series::new(PRODUCT_TYPE.into(), products).into(),
        Series::new(REGION.into(), regions).into(),
        Series::new(SEX.into(), sexes).into(),
    ])?;
    Ok(df)
}

/// Rebuild typed records from a cleaned table.
///
/// Accepts both the freshly built table and one reloaded from the cleaned
/// artifact (where every column is text). Values outside the domain mean the
/// artifact was not produced by the cleaner and are reported as corrupt.
pub fn records_from_frame(df: &DataFrame) -> Result<Vec<CleanedRecord>> {
    let columns = REQUIRED_COLUMNS
        .iter()
        .map(|name| {
            let column = df
                .column(name)
                .map_err(|_| CleanError::MissingColumn((*name).to_string()))?;
            Ok(column.cast(&DataType::String)?)
        })
        .collect::<Result<Vec<Column>>>()?;
    let text = columns
        .iter()
        .map(|c| c.str())
        .collect::<PolarsResult<Vec<&StringChunked>>>()?;

    let [date, indemnity, salvage, recovery, event, cause, modality, product, region, sex] =
        text.as_slice()
    else {
        unreachable!("one text column per required column")
    };

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        records.push(CleanedRecord {
            occurrence_date: date.get(i).unwrap_or_default().to_string(),
            indemnity: parse_amount(INDEMNITY, indemnity.get(i))?,
            salvage: parse_amount(SALVAGE, salvage.get(i))?,
            recovery: parse_amount(RECOVERY, recovery.get(i))?,
            event: domain_value(EVENT, event.get(i), EventCode::parse)?,
            cause: domain_value(CAUSE, cause.get(i), CauseCode::parse)?,
            modality: category(modality.get(i)),
            product_type: category(product.get(i)),
            region: domain_value(REGION, region.get(i), RegionCode::parse)?,
            sex: domain_value(SEX, sex.get(i), Sex::parse)?,
        });
    }
    Ok(records)
}

fn domain_value<T>(
    column: &'static str,
    raw: Option<&str>,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T> {
    raw.and_then(parse)
        .ok_or_else(|| CleanError::CorruptArtifact {
            column,
            value: raw.unwrap_or_default().to_string(),
        })
}
