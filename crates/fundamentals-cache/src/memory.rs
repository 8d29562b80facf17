//! In-memory cache implementation.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use fundamentals_core::{FactsCache, RawFactsDocument, Result, Symbol};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Cache entry with timestamp for TTL-based invalidation.
#[derive(Debug, Clone)]
struct CacheEntry {
    document: Arc<RawFactsDocument>,
    cached_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(document: Arc<RawFactsDocument>) -> Self {
        Self {
            document,
            cached_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age > TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FactsKey {
    provider: String,
    symbol: Symbol,
}

impl FactsKey {
    fn new(provider: &str, symbol: &Symbol) -> Self {
        Self {
            provider: provider.to_string(),
            symbol: symbol.clone(),
        }
    }
}

/// Process-local document cache.
///
/// Documents live in a `RwLock`-protected `HashMap` and are dropped with the
/// cache. Hits hand out another `Arc` to the stored document rather than a
/// copy.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    facts: RwLock<HashMap<FactsKey, CacheEntry>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached documents.
    pub async fn len(&self) -> usize {
        self.facts.read().await.len()
    }

    /// Whether the cache holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.facts.read().await.is_empty()
    }
}

#[async_trait]
impl FactsCache for InMemoryCache {
    #[instrument(skip(self), fields(provider = %provider, symbol = %symbol))]
    async fn get_facts(
        &self,
        provider: &str,
        symbol: &Symbol,
    ) -> Result<Option<Arc<RawFactsDocument>>> {
        let cache = self.facts.read().await;
        match cache.get(&FactsKey::new(provider, symbol)) {
            Some(entry) => {
                debug!("Cache hit for company facts");
                Ok(Some(Arc::clone(&entry.document)))
            }
            None => {
                debug!("Cache miss for company facts");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, document), fields(provider = %provider, symbol = %symbol))]
    async fn put_facts(
        &self,
        provider: &str,
        symbol: &Symbol,
        document: Arc<RawFactsDocument>,
    ) -> Result<()> {
        let facts = document.fact_count();
        let mut cache = self.facts.write().await;
        cache.insert(FactsKey::new(provider, symbol), CacheEntry::new(document));
        debug!("Cached document with {} facts", facts);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let mut cache = self.facts.write().await;
        let before = cache.len();
        cache.retain(|_, entry| !entry.is_stale(ttl));
        let removed = before - cache.len();

        if removed > 0 {
            debug!("Invalidated {} stale cache entries", removed);
        }

        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.facts.write().await.clear();
        debug!("Cleared all cache entries");
        Ok(())
    }
}
