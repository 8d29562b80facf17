//! Document fetching with source fallback, plus pipeline runs.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, instrument, warn};

use fundamentals_core::{
    FactsCache, FactsSource, FundamentalsError, RawFactsDocument, Result, Symbol,
};
use fundamentals_pipeline::{DisplayTable, Pipeline, PipelineOutput};

/// Fetches facts documents and turns them into financial tables.
///
/// Sources are tried in registration order until one succeeds. If a cache is
/// configured it is consulted first, under each source's name, and documents
/// are stored back under the name of the source that produced them.
pub struct FundamentalsService {
    sources: Vec<Arc<dyn FactsSource>>,
    cache: Option<Arc<dyn FactsCache>>,
    pipeline: Pipeline,
}

impl std::fmt::Debug for FundamentalsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FundamentalsService")
            .field(
                "sources",
                &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("cache", &self.cache.as_ref().map(|_| "configured"))
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl FundamentalsService {
    /// Creates a service with no sources and no cache.
    #[must_use]
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            sources: Vec::new(),
            cache: None,
            pipeline,
        }
    }

    /// Set the cache for this service.
    #[must_use]
    pub fn set_cache(mut self, cache: Arc<dyn FactsCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Register a document source after any already registered.
    pub fn register_source(&mut self, source: Arc<dyn FactsSource>) {
        debug!(provider = source.name(), "Registering facts source");
        self.sources.push(source);
    }

    /// Add a source, builder style.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn FactsSource>) -> Self {
        self.register_source(source);
        self
    }

    /// The pipeline documents are run through.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Fetches the raw document for `symbol`.
    ///
    /// Cache errors are logged and treated as misses. When every source fails,
    /// the last source's error is returned.
    #[instrument(skip(self), fields(symbol = %symbol))]
    pub async fn fetch_document(&self, symbol: &Symbol) -> Result<Arc<RawFactsDocument>> {
        if self.sources.is_empty() {
            return Err(FundamentalsError::ProviderNotConfigured(
                "No facts sources registered".to_string(),
            ));
        }

        if let Some(cache) = &self.cache {
            for source in &self.sources {
                match cache.get_facts(source.name(), symbol).await {
                    Ok(Some(cached)) => {
                        debug!(provider = source.name(), "Cache hit for company facts");
                        return Ok(cached);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!(provider = source.name(), error = %e, "Cache lookup failed");
                    }
                }
            }
        }

        let mut last_error = None;
        for source in &self.sources {
            debug!(provider = source.name(), "Fetching company facts");

            match source.fetch_facts_for(symbol).await {
                Ok(document) => {
                    let document = Arc::new(document);
                    if let Some(cache) = &self.cache {
                        if let Err(e) = cache
                            .put_facts(source.name(), symbol, Arc::clone(&document))
                            .await
                        {
                            warn!(
                                provider = source.name(),
                                error = %e,
                                "Failed to cache company facts"
                            );
                        }
                    }
                    return Ok(document);
                }
                Err(e) => {
                    warn!(
                        provider = source.name(),
                        error = %e,
                        "Source failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            FundamentalsError::Other("All sources failed with no error".to_string())
        }))
    }

    /// Fetches the document for `symbol` and runs the pipeline over it.
    pub async fn financial_table(&self, symbol: &Symbol) -> Result<PipelineOutput> {
        let document = self.fetch_document(symbol).await?;
        let output = self.pipeline.run(&document)?;
        debug!(
            symbol = %symbol,
            rows = output.table.height(),
            gaps = output.gaps.len(),
            "Built financial table"
        );
        Ok(output)
    }

    /// Builds tables for many symbols, at most `concurrency` at a time.
    ///
    /// Every symbol gets its own result and one failure does not affect the
    /// others. Results come back in the order of `symbols`. A `concurrency`
    /// of zero is treated as one.
    pub async fn financial_tables(
        &self,
        symbols: &[Symbol],
        concurrency: usize,
    ) -> Vec<(Symbol, Result<PipelineOutput>)> {
        let mut results: Vec<_> = stream::iter(symbols.iter().enumerate())
            .map(|(index, symbol)| async move {
                (index, symbol.clone(), self.financial_table(symbol).await)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        results.sort_by_key(|(index, _, _)| *index);
        results
            .into_iter()
            .map(|(_, symbol, result)| (symbol, result))
            .collect()
    }

    /// Formats a table with the pipeline's render configuration.
    pub fn render(&self, output: &PipelineOutput) -> DisplayTable {
        self.pipeline.render(&output.table)
    }

    /// Add the SEC EDGAR HTTP source.
    #[cfg(feature = "edgar")]
    pub fn with_edgar(mut self, user_agent: &str) -> Result<Self> {
        let source = fundamentals_edgar::EdgarSource::new(user_agent)?;
        self.register_source(Arc::new(source));
        Ok(self)
    }

    /// Add a source over an unpacked EDGAR bulk archive.
    ///
    /// `tickers_file`, if given, is a local `company_tickers.json` used to
    /// resolve tickers; without it only CIK symbols resolve.
    #[cfg(feature = "edgar")]
    #[must_use]
    pub fn with_bulk_directory(
        mut self,
        root: impl Into<std::path::PathBuf>,
        tickers_file: Option<std::path::PathBuf>,
    ) -> Self {
        let mut source = fundamentals_edgar::BulkDirectorySource::new(root);
        if let Some(path) = tickers_file {
            source = source.with_tickers_file(path);
        }
        self.register_source(Arc::new(source));
        self
    }
}
