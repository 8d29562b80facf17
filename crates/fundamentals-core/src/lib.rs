#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for annual fundamentals tables.
//!
//! - [`RawFactsDocument`](document::RawFactsDocument) - Raw XBRL facts, as fetched
//! - [`AccountSeries`](series::AccountSeries) - One account's annual values
//! - [`PipelineConfig`](config::PipelineConfig) - Everything a pipeline run needs
//! - [`FactsSource`](source::FactsSource) - Where documents come from
//! - [`FactsCache`](cache::FactsCache) - Caching abstraction

/// Cache trait for fetched documents.
pub mod cache;
/// Pipeline and rendering configuration.
pub mod config;
/// Raw facts document model.
pub mod document;
/// Error types.
pub mod error;
/// Annual account series.
pub mod series;
/// Source trait for fetching documents.
pub mod source;
/// Company identifiers.
pub mod types;

// Re-export commonly used items at crate root
pub use cache::FactsCache;
pub use config::{
    CanonicalColumnSet, DerivedMetric, Formula, PipelineConfig, RenderConfig, Term, Threshold,
    columns,
};
pub use document::{AccountFacts, FactRecord, RawFactsDocument, Taxonomy};
pub use error::{FundamentalsError, Result};
pub use series::AccountSeries;
pub use source::FactsSource;
pub use types::{Cik, Symbol};
