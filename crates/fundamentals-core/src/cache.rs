//! Cache trait for fetched facts documents.
//!
//! This module defines the [`FactsCache`] trait. Documents are shared as
//! `Arc<RawFactsDocument>` since a single company document can run to several
//! megabytes and is read by many pipeline runs.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::{document::RawFactsDocument, error::Result, types::Symbol};

/// Trait for caching fetched facts documents.
///
/// Entries are keyed by source name and symbol, so two sources never see each
/// other's documents.
#[async_trait]
pub trait FactsCache: Send + Sync {
    /// Retrieves a cached document.
    ///
    /// Returns `Ok(Some(doc))` if cached, `Ok(None)` if not cached.
    async fn get_facts(
        &self,
        provider: &str,
        symbol: &Symbol,
    ) -> Result<Option<Arc<RawFactsDocument>>>;

    /// Stores a document.
    async fn put_facts(
        &self,
        provider: &str,
        symbol: &Symbol,
        document: Arc<RawFactsDocument>,
    ) -> Result<()>;

    /// Removes cache entries older than the specified TTL.
    ///
    /// Returns the number of entries invalidated.
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize>;

    /// Clears all cached data.
    async fn clear(&self) -> Result<()>;
}
