//! No-op cache implementation.

use async_trait::async_trait;
use fundamentals_core::{FactsCache, RawFactsDocument, Result, Symbol};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// A cache that never stores anything.
///
/// Every lookup misses, so each request goes to a source.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FactsCache for NoopCache {
    async fn get_facts(
        &self,
        _provider: &str,
        _symbol: &Symbol,
    ) -> Result<Option<Arc<RawFactsDocument>>> {
        trace!("NoopCache: get_facts called, returning None");
        Ok(None)
    }

    async fn put_facts(
        &self,
        _provider: &str,
        _symbol: &Symbol,
        _document: Arc<RawFactsDocument>,
    ) -> Result<()> {
        trace!("NoopCache: put_facts called, doing nothing");
        Ok(())
    }

    async fn invalidate_stale(&self, _ttl: Duration) -> Result<usize> {
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}
