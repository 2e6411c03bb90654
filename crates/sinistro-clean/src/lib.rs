#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sinistro/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cleaner;
pub mod codes;
pub mod error;
pub mod record;
pub mod region;
pub mod schema;

pub use cleaner::{CleanStage, CleaningReport, clean_data, clean_records, load_cleaned};
pub use codes::{CauseCode, EventCode, Sex};
pub use error::{CleanError, Result};
pub use record::{CleanedRecord, records_from_frame, records_to_frame};
pub use region::RegionCode;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
