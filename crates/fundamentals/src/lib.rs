#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Annual financial tables from SEC XBRL company facts.
//!
//! This crate re-exports the core types, the pipeline stages and the source
//! implementations, and provides a [`FundamentalsService`] that fetches a
//! document (cache first, then each registered source in order) and runs the
//! pipeline over it.
//!
//! # Features
//!
//! - `edgar` - SEC EDGAR HTTP and bulk-directory sources
//!
//! # Example
//!
//! ```rust,ignore
//! use fundamentals::{FundamentalsService, InMemoryCache, Pipeline, PipelineConfig, Symbol};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> fundamentals::Result<()> {
//!     let service = FundamentalsService::new(Pipeline::new(PipelineConfig::default())?)
//!         .with_edgar("MyApp/1.0 (contact@example.com)")?
//!         .set_cache(Arc::new(InMemoryCache::new()));
//!
//!     let output = service.financial_table(&Symbol::new("META")).await?;
//!     for (year, row) in service.render(&output).rows() {
//!         println!("{year}: {row:?}");
//!     }
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use fundamentals_core::*;

// Cache implementations
pub use fundamentals_cache::{InMemoryCache, NoopCache};

// Pipeline
pub use fundamentals_pipeline::{
    AccountExtractor, ColumnFiller, DisplayTable, DisplayValue, Extraction, FinancialTable,
    Formatter, MetricsCalculator, Pipeline, PipelineOutput, REPORTING_UNIT, SchemaNormalizer,
    checked_ratio, merge_series, round_to,
};

// Sources
#[cfg(feature = "edgar")]
pub use fundamentals_edgar::{BulkDirectorySource, EdgarSource};

mod service;
pub use service::FundamentalsService;
