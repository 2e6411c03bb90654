//! Occurrence-date parsing.

use chrono::{Datelike, NaiveDate};

/// Days from 0001-01-01 (CE) to 1970-01-01, the epoch of polars `Date`.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Why an occurrence date was excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRejection {
    /// Not exactly eight ASCII digits
    Malformed,
    /// Eight digits that do not name a calendar day (e.g. `20201340`)
    Impossible,
}

/// Parse a strict `YYYYMMDD` date.
///
/// No trimming or other coercion is applied: anything but exactly eight
/// digits is [`DateRejection::Malformed`].
pub fn parse_occurrence_date(raw: &str) -> Result<NaiveDate, DateRejection> {
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateRejection::Malformed);
    }

    let year = raw[0..4].parse().map_err(|_| DateRejection::Malformed)?;
    let month = raw[4..6].parse().map_err(|_| DateRejection::Malformed)?;
    let day = raw[6..8].parse().map_err(|_| DateRejection::Malformed)?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or(DateRejection::Impossible)
}

/// Physical value of a polars `Date`.
pub fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}
