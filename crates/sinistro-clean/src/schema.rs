//! Column names of the claim extracts.

use crate::error::{CleanError, Result};
use polars::prelude::DataFrame;

/// Occurrence date, `YYYYMMDD`
pub const OCCURRENCE_DATE: &str = "D_OCORR";
/// Indemnity paid
pub const INDEMNITY: &str = "INDENIZ";
/// Salvage value
pub const SALVAGE: &str = "VAL_SALVAD";
/// Recovery value
pub const RECOVERY: &str = "VAL_RESS";
/// Event code, 1 to 9
pub const EVENT: &str = "EVENTO";
/// Cause code, 1 to 8
pub const CAUSE: &str = "CAUSA";
/// Policy modality
pub const MODALITY: &str = "MODALIDADE";
/// Product type
pub const PRODUCT_TYPE: &str = "TIPO_PROD";
/// Region code or abbreviation
pub const REGION: &str = "REGIAO";
/// Sex of the insured, `M` or `F`
pub const SEX: &str = "SEXO";

/// Columns kept by the cleaner, in output order.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    OCCURRENCE_DATE,
    INDEMNITY,
    SALVAGE,
    RECOVERY,
    EVENT,
    CAUSE,
    MODALITY,
    PRODUCT_TYPE,
    REGION,
    SEX,
];

/// Monetary columns.
pub const MONETARY_COLUMNS: [&str; 3] = [INDEMNITY, SALVAGE, RECOVERY];

/// Placeholder for a missing free-form category.
pub const MISSING_CATEGORY: &str = "NA";

/// Positions of the required columns in `df`, in [`REQUIRED_COLUMNS`] order.
///
/// Fails on the first required column the table does not have.
pub fn required_positions(df: &DataFrame) -> Result<[usize; 10]> {
    let mut positions = [0; 10];
    for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = df
            .get_column_index(name)
            .ok_or_else(|| CleanError::MissingColumn(name.to_string()))?;
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_required_positions_follow_column_order() {
        let mut columns: Vec<Column> = vec![Series::new("EXTRA".into(), vec!["x"]).into()];
        for name in REQUIRED_COLUMNS.iter().rev() {
            columns.push(Series::new((*name).into(), vec!["1"]).into());
        }
        let df = DataFrame::new(columns).unwrap();

        let positions = required_positions(&df).unwrap();
        assert_eq!(positions[0], 10);
        assert_eq!(positions[9], 1);
    }

    #[test]
    fn test_missing_column_is_schema_violation() {
        let df = DataFrame::new(vec![Series::new(OCCURRENCE_DATE.into(), vec!["20200101"]).into()])
            .unwrap();
        let err = required_positions(&df).unwrap_err();
        assert!(matches!(err, CleanError::MissingColumn(name) if name == INDEMNITY));
    }
}
