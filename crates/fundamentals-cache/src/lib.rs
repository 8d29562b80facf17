#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Caches for fetched facts documents.
//!
//! This crate provides implementations of the [`FactsCache`] trait from
//! `fundamentals-core`:
//!
//! - [`InMemoryCache`] - Process-local cache with TTL invalidation
//! - [`NoopCache`] - No-op cache that doesn't store anything

/// In-memory cache implementation.
pub mod memory;
/// No-op cache implementation.
pub mod noop;

pub use fundamentals_core::FactsCache;

pub use memory::InMemoryCache;
pub use noop::NoopCache;
