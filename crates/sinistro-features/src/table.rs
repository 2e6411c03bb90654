//! Final-table codec.

use crate::date::days_since_epoch;
use crate::encoding::IndicatorColumn;
use crate::error::{FeatureError, Result};
use crate::temporal::DailyAggregate;
use chrono::NaiveDate;
use polars::prelude::*;
use sinistro_clean::schema::{INDEMNITY, OCCURRENCE_DATE, RECOVERY, SALVAGE};

/// Date format of the persisted `D_OCORR` column.
pub const FINAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Build the final table: `D_OCORR` as a `Date`, the three summed monetary
/// columns, then one `Float64` column per indicator, in `indicators` order.
pub fn daily_frame(indicators: &[IndicatorColumn], rows: &[DailyAggregate]) -> Result<DataFrame> {
    let days: Vec<i32> = rows.iter().map(|r| days_since_epoch(r.date)).collect();
    let indemnity: Vec<f64> = rows.iter().map(|r| r.indemnity).collect();
    let salvage: Vec<f64> = rows.iter().map(|r| r.salvage).collect();
    let recovery: Vec<f64> = rows.iter().map(|r| r.recovery).collect();

    let mut columns: Vec<Column> = Vec::with_capacity(4 + indicators.len());
    columns.push(
        Series::new(OCCURRENCE_DATE.into(), days)
            .cast(&DataType::Date)?
            .into(),
    );
    columns.push(Series::new(INDEMNITY.into(), indemnity).into());
    columns.push(Series::new(SALVAGE.into(), salvage).into());
    columns.push(Series::new(RECOVERY.into(), recovery).into());

    for (i, indicator) in indicators.iter().enumerate() {
        let values: Vec<Option<f64>> = rows
            .iter()
            .map(|r| r.weighted.get(i).copied().flatten())
            .collect();
        columns.push(Series::new(indicator.name().into(), values).into());
    }

    Ok(DataFrame::new(columns)?)
}

/// Re-type a final table reloaded as text.
///
/// The first column must be `D_OCORR` in `YYYY-MM-DD` form; every other
/// column is parsed as `f64`, with empty cells read as null.
pub fn decode_final_frame(raw: &DataFrame) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(raw.width());

    for column in raw.get_columns() {
        let name = column.name().clone();
        let text = column.cast(&DataType::String)?;
        let text = text.str()?;

        if name.as_str() == OCCURRENCE_DATE {
            let days = text
                .into_iter()
                .map(|value| {
                    let value = value.unwrap_or_default();
                    NaiveDate::parse_from_str(value, FINAL_DATE_FORMAT)
                        .map(days_since_epoch)
                        .map_err(|_| corrupt(OCCURRENCE_DATE, value))
                })
                .collect::<Result<Vec<i32>>>()?;
            columns.push(Series::new(name, days).cast(&DataType::Date)?.into());
        } else {
            let values = text
                .into_iter()
                .map(|value| match value.map(str::trim) {
                    None | Some("") => Ok(None),
                    Some(v) => v.parse::<f64>().map(Some).map_err(|_| corrupt(&name, v)),
                })
                .collect::<Result<Vec<Option<f64>>>>()?;
            columns.push(Series::new(name, values).into());
        }
    }

    if columns.first().map(|c| c.name().as_str()) != Some(OCCURRENCE_DATE) {
        return Err(FeatureError::CorruptArtifact {
            column: OCCURRENCE_DATE.to_string(),
            value: "<missing>".to_string(),
        });
    }

    Ok(DataFrame::new(columns)?)
}

fn corrupt(column: &str, value: &str) -> FeatureError {
    FeatureError::CorruptArtifact {
        column: column.to_string(),
        value: value.to_string(),
    }
}
