#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Turns a raw XBRL facts document into a year-indexed financial table.
//!
//! Every stage is a pure function over in-memory values:
//!
//! 1. [`AccountExtractor`] - one annual USD series per requested account
//! 2. [`merge_series`] - full outer join on fiscal year
//! 3. [`SchemaNormalizer::rename`] - raw element names to canonical fields
//! 4. [`ColumnFiller`] - derive unreported values, e.g. `Liabilities` from
//!    `Assets - StockholdersEquity`
//! 5. [`MetricsCalculator`] - `valuation`, `ac/l`, `cf/l` and any extra metrics
//! 6. [`SchemaNormalizer::drop_intermediate`] - remove consumed inputs
//! 7. [`Formatter`] - `T`/`B`/`M` display values, presentation only
//!
//! [`Pipeline`] wires the stages together from a
//! [`PipelineConfig`](fundamentals_core::PipelineConfig).
//!
//! # Example
//!
//! ```
//! use fundamentals_core::{PipelineConfig, RawFactsDocument};
//! use fundamentals_pipeline::Pipeline;
//!
//! let doc = RawFactsDocument::from_json(r#"{
//!     "facts": {"us-gaap": {
//!         "NetCashProvidedByUsedInOperatingActivities": {"units": {"USD": [
//!             {"end": "2023-12-31", "val": 100, "fp": "FY"}
//!         ]}},
//!         "CashAndCashEquivalentsAtCarryingValue": {"units": {"USD": [
//!             {"end": "2023-12-31", "val": 50, "fp": "FY"}
//!         ]}},
//!         "LongTermDebt": {"units": {"USD": [
//!             {"end": "2023-12-31", "val": 30, "fp": "FY"}
//!         ]}}
//!     }}
//! }"#)?;
//!
//! let pipeline = Pipeline::new(PipelineConfig::default())?;
//! let output = pipeline.run(&doc)?;
//! assert_eq!(output.table.value(2023, "valuation"), Some(2020.0));
//! # Ok::<(), fundamentals_core::FundamentalsError>(())
//! ```

/// Annual series extraction.
pub mod extract;
/// Null-cell fills.
pub mod fill;
/// Presentation formatting.
pub mod format;
/// Series merging.
pub mod merge;
/// Derived metrics.
pub mod metrics;
/// Column renames and drops.
pub mod normalize;
/// Stage orchestration.
pub mod pipeline;
/// Financial table.
pub mod table;

pub use extract::{AccountExtractor, Extraction, REPORTING_UNIT};
pub use fill::ColumnFiller;
pub use format::{DisplayTable, DisplayValue, Formatter};
pub use merge::merge_series;
pub use metrics::{MetricsCalculator, checked_ratio, round_to};
pub use normalize::SchemaNormalizer;
pub use pipeline::{Pipeline, PipelineOutput};
pub use table::FinancialTable;
