#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sinistro/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod date;
pub mod encoding;
pub mod error;
pub mod stage;
pub mod table;
pub mod temporal;

pub use encoding::{CategoricalField, EncodedRecord, IndicatorColumn, OneHotEncoder};
pub use error::{FeatureError, Result};
pub use stage::{FeatureStage, build_daily_table, load_final, process_data};
pub use temporal::{AggregationReport, DailyAggregate, ZeroWeightPolicy, aggregate_by_date};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
