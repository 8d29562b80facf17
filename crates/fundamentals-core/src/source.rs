//! Source trait for retrieving raw facts documents.
//!
//! Sources are the I/O boundary: they resolve a ticker to a CIK and fetch the
//! company's facts document. Everything downstream of a source is pure.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    document::RawFactsDocument,
    error::Result,
    types::{Cik, Symbol},
};

/// Provider of raw facts documents.
#[async_trait]
pub trait FactsSource: Send + Sync + Debug {
    /// Returns the name of this source (e.g., "SEC EDGAR").
    fn name(&self) -> &str;

    /// Returns a description of this source.
    fn description(&self) -> &str;

    /// Resolves a ticker symbol to a CIK.
    ///
    /// Returns [`SymbolNotFound`](crate::FundamentalsError::SymbolNotFound) if
    /// the source does not know the symbol.
    async fn resolve_cik(&self, symbol: &Symbol) -> Result<Cik>;

    /// Fetches the facts document for a CIK.
    async fn fetch_facts(&self, cik: &Cik) -> Result<RawFactsDocument>;

    /// Resolves the symbol and fetches its facts document.
    async fn fetch_facts_for(&self, symbol: &Symbol) -> Result<RawFactsDocument> {
        let cik = self.resolve_cik(symbol).await?;
        self.fetch_facts(&cik).await
    }
}
