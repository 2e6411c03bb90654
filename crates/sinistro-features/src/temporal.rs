//! Claim-value-weighted daily aggregation.
//!
//! Rows are grouped by occurrence date. Monetary fields are summed, and every
//! indicator column becomes `Σ(cᵢ·indemnityᵢ) / Σ indemnityᵢ` over the group,
//! so each weighted mean is the indemnity share of that category on that day.

use crate::date::{DateRejection, parse_occurrence_date};
use crate::encoding::EncodedRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// What to emit for a date whose total indemnity is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroWeightPolicy {
    /// Every weighted mean is 0.0
    #[default]
    Zero,
    /// Every weighted mean is null
    Null,
    /// The date is dropped from the output
    Exclude,
}

impl ZeroWeightPolicy {
    /// Policy name as accepted by [`FromStr`].
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::Null => "null",
            Self::Exclude => "exclude",
        }
    }
}

impl fmt::Display for ZeroWeightPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZeroWeightPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zero" => Ok(Self::Zero),
            "null" => Ok(Self::Null),
            "exclude" => Ok(Self::Exclude),
            other => Err(format!("unknown zero-weight policy: {other}")),
        }
    }
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    /// Occurrence date
    pub date: NaiveDate,
    /// Summed indemnity
    pub indemnity: f64,
    /// Summed salvage value
    pub salvage: f64,
    /// Summed recovery value
    pub recovery: f64,
    /// Weighted mean per indicator column, `None` only under [`ZeroWeightPolicy::Null`]
    pub weighted: Vec<Option<f64>>,
}

/// Row counts of one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationReport {
    /// Encoded rows
    pub rows_in: usize,
    /// Rows whose date is not eight digits
    pub malformed_dates: usize,
    /// Rows whose eight-digit date is not a calendar day
    pub impossible_dates: usize,
    /// Distinct valid dates
    pub date_groups: usize,
    /// Dates whose total indemnity is zero
    pub zero_weight_groups: usize,
    /// Rows emitted
    pub rows_out: usize,
    /// Indicator columns per row
    pub indicator_columns: usize,
}

#[derive(Debug)]
struct Accumulator {
    indemnity: f64,
    salvage: f64,
    recovery: f64,
    numerators: Vec<f64>,
}

impl Accumulator {
    fn new(width: usize) -> Self {
        Self {
            indemnity: 0.0,
            salvage: 0.0,
            recovery: 0.0,
            numerators: vec![0.0; width],
        }
    }

    fn add(&mut self, record: &EncodedRecord) {
        self.indemnity += record.indemnity;
        self.salvage += record.salvage;
        self.recovery += record.recovery;
        for &column in &record.hot {
            self.numerators[column] += record.indemnity;
        }
    }

    fn finish(self, date: NaiveDate, policy: ZeroWeightPolicy) -> Option<DailyAggregate> {
        let weighted = if self.indemnity > 0.0 {
            self.numerators
                .iter()
                .map(|numerator| Some(numerator / self.indemnity))
                .collect()
        } else {
            match policy {
                ZeroWeightPolicy::Zero => vec![Some(0.0); self.numerators.len()],
                ZeroWeightPolicy::Null => vec![None; self.numerators.len()],
                ZeroWeightPolicy::Exclude => return None,
            }
        };

        Some(DailyAggregate {
            date,
            indemnity: self.indemnity,
            salvage: self.salvage,
            recovery: self.recovery,
            weighted,
        })
    }
}

/// Group encoded rows by occurrence date, in ascending date order.
///
/// `width` is the number of indicator columns of the encoder that produced
/// `encoded`. Rows with a malformed or impossible date are excluded and only
/// counted.
pub fn aggregate_by_date(
    encoded: &[EncodedRecord],
    width: usize,
    policy: ZeroWeightPolicy,
) -> (Vec<DailyAggregate>, AggregationReport) {
    let mut report = AggregationReport {
        rows_in: encoded.len(),
        indicator_columns: width,
        ..Default::default()
    };

    let mut groups: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();
    for record in encoded {
        match parse_occurrence_date(&record.occurrence_date) {
            Ok(date) => groups
                .entry(date)
                .or_insert_with(|| Accumulator::new(width))
                .add(record),
            Err(DateRejection::Malformed) => report.malformed_dates += 1,
            Err(DateRejection::Impossible) => report.impossible_dates += 1,
        }
    }
    report.date_groups = groups.len();

    let mut rows = Vec::with_capacity(groups.len());
    for (date, accumulator) in groups {
        if accumulator.indemnity <= 0.0 {
            report.zero_weight_groups += 1;
            debug!(%date, %policy, "Zero total indemnity");
        }
        rows.extend(accumulator.finish(date, policy));
    }
    report.rows_out = rows.len();

    if report.malformed_dates + report.impossible_dates > 0 {
        debug!(
            malformed = report.malformed_dates,
            impossible = report.impossible_dates,
            "Excluded rows with invalid occurrence dates"
        );
    }
    if report.zero_weight_groups > 0 {
        warn!(
            groups = report.zero_weight_groups,
            %policy,
            "Dates with zero total indemnity"
        );
    }

    (rows, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn encoded(date: &str, indemnity: f64, hot: [usize; 6]) -> EncodedRecord {
        EncodedRecord {
            occurrence_date: date.to_string(),
            indemnity,
            salvage: 1.0,
            recovery: 0.5,
            hot,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // Columns: EVENTO_2, CAUSA_3, CAUSA_5, MODALIDADE_A, TIPO_PROD_AUTO,
    // REGIAO_35, SEXO_F, SEXO_M
    const WIDTH: usize = 8;

    #[test]
    fn test_weighted_shares_for_single_day() {
        let rows = vec![
            encoded("20200115", 100.0, [0, 1, 3, 4, 5, 7]),
            encoded("20200115", 300.0, [0, 2, 3, 4, 5, 6]),
        ];
        let (daily, report) = aggregate_by_date(&rows, WIDTH, ZeroWeightPolicy::Zero);

        assert_eq!(daily.len(), 1);
        let row = &daily[0];
        assert_eq!(row.date, day(2020, 1, 15));
        assert_relative_eq!(row.indemnity, 400.0);
        assert_relative_eq!(row.salvage, 2.0);
        assert_relative_eq!(row.recovery, 1.0);
        assert_relative_eq!(row.weighted[0].unwrap(), 1.0);
        assert_relative_eq!(row.weighted[1].unwrap(), 0.25);
        assert_relative_eq!(row.weighted[2].unwrap(), 0.75);
        assert_relative_eq!(row.weighted[6].unwrap(), 0.75);
        assert_relative_eq!(row.weighted[7].unwrap(), 0.25);
        assert_eq!(report.date_groups, 1);
        assert_eq!(report.rows_out, 1);
    }

    #[test]
    fn test_output_is_date_ordered() {
        let rows = vec![
            encoded("20200301", 1.0, [0, 1, 3, 4, 5, 7]),
            encoded("20191231", 1.0, [0, 1, 3, 4, 5, 7]),
            encoded("20200115", 1.0, [0, 1, 3, 4, 5, 7]),
            encoded("20191231", 2.0, [0, 2, 3, 4, 5, 6]),
        ];
        let (daily, _) = aggregate_by_date(&rows, WIDTH, ZeroWeightPolicy::Zero);

        let dates: Vec<NaiveDate> = daily.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(2019, 12, 31), day(2020, 1, 15), day(2020, 3, 1)]);
        assert_relative_eq!(daily[0].indemnity, 3.0);
    }

    #[test]
    fn test_weighted_means_are_bounded() {
        let amounts = [0.1, 7.0, 1e6, 3.3, 0.0, 42.0, 1e-3];
        let rows: Vec<EncodedRecord> = amounts
            .iter()
            .enumerate()
            .map(|(i, &a)| {
                let sex = if i % 2 == 0 { 6 } else { 7 };
                let cause = if i % 3 == 0 { 1 } else { 2 };
                encoded("20200115", a, [0, cause, 3, 4, 5, sex])
            })
            .collect();
        let (daily, _) = aggregate_by_date(&rows, WIDTH, ZeroWeightPolicy::Zero);

        for value in daily.iter().flat_map(|r| r.weighted.iter().flatten()) {
            assert!((0.0..=1.0).contains(value), "{value} out of bounds");
        }
    }

    #[test]
    fn test_invalid_dates_are_excluded() {
        let rows = vec![
            encoded("20200115", 10.0, [0, 1, 3, 4, 5, 7]),
            encoded("2020-01-15", 99.0, [0, 2, 3, 4, 5, 6]),
            encoded("20201340", 99.0, [0, 2, 3, 4, 5, 6]),
        ];
        let (daily, report) = aggregate_by_date(&rows, WIDTH, ZeroWeightPolicy::Zero);

        assert_eq!(daily.len(), 1);
        assert_relative_eq!(daily[0].indemnity, 10.0);
        assert_relative_eq!(daily[0].weighted[7].unwrap(), 1.0);
        assert_eq!(report.malformed_dates, 1);
        assert_eq!(report.impossible_dates, 1);
    }

    #[rstest]
    #[case(ZeroWeightPolicy::Zero, Some(Some(0.0)))]
    #[case(ZeroWeightPolicy::Null, Some(None))]
    #[case(ZeroWeightPolicy::Exclude, None)]
    fn test_zero_weight_policy(
        #[case] policy: ZeroWeightPolicy,
        #[case] expected: Option<Option<f64>>,
    ) {
        let rows = vec![
            encoded("20200115", 0.0, [0, 1, 3, 4, 5, 7]),
            encoded("20200116", 5.0, [0, 1, 3, 4, 5, 7]),
        ];
        let (daily, report) = aggregate_by_date(&rows, WIDTH, policy);

        assert_eq!(report.zero_weight_groups, 1);
        let zero_day = daily.iter().find(|r| r.date == day(2020, 1, 15));
        assert_eq!(zero_day.map(|r| r.weighted[0]), expected);
        assert!(daily.iter().any(|r| r.date == day(2020, 1, 16)));
    }

    #[rstest]
    #[case("zero", ZeroWeightPolicy::Zero)]
    #[case("null", ZeroWeightPolicy::Null)]
    #[case("exclude", ZeroWeightPolicy::Exclude)]
    fn test_policy_from_str(#[case] raw: &str, #[case] expected: ZeroWeightPolicy) {
        assert_eq!(raw.parse::<ZeroWeightPolicy>().unwrap(), expected);
        assert_eq!(expected.to_string(), raw);
    }

    #[test]
    fn test_empty_input() {
        let (daily, report) = aggregate_by_date(&[], 0, ZeroWeightPolicy::Zero);
        assert!(daily.is_empty());
        assert_eq!(report, AggregationReport::default());
    }
}
