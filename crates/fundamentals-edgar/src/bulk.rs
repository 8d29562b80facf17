//! Source over an unpacked EDGAR bulk `companyfacts` archive.

use async_trait::async_trait;
use fundamentals_core::{Cik, FactsSource, FundamentalsError, RawFactsDocument, Result, Symbol};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::tickers::{find_cik, parse_tickers};

/// Reads `CIK##########.json` files from a local directory.
///
/// SEC publishes every company's facts nightly as one archive
/// (`companyfacts.zip`); unpacked, it is a flat directory of facts documents
/// with the same shape the HTTP API returns.
///
/// Ticker lookup needs a local copy of `company_tickers.json`. Without one,
/// only numeric symbols (CIKs) resolve.
#[derive(Debug, Clone)]
pub struct BulkDirectorySource {
    root: PathBuf,
    tickers_path: Option<PathBuf>,
}

impl BulkDirectorySource {
    /// Creates a source reading documents from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            tickers_path: None,
        }
    }

    /// Uses a local `company_tickers.json` for ticker lookup.
    #[must_use]
    pub fn with_tickers_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.tickers_path = Some(path.into());
        self
    }

    /// Directory the documents are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a company's facts document.
    pub fn document_path(&self, cik: &Cik) -> PathBuf {
        self.root.join(cik.facts_file_name())
    }
}

#[async_trait]
impl FactsSource for BulkDirectorySource {
    fn name(&self) -> &str {
        "EDGAR bulk directory"
    }

    fn description(&self) -> &str {
        "Company facts read from an unpacked SEC EDGAR companyfacts archive"
    }

    async fn resolve_cik(&self, symbol: &Symbol) -> Result<Cik> {
        if symbol.is_numeric() {
            return Cik::parse(symbol.as_str());
        }

        let Some(path) = &self.tickers_path else {
            return Err(FundamentalsError::SymbolNotFound(format!(
                "{symbol} (no tickers file configured)"
            )));
        };

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            FundamentalsError::Other(format!("Failed to read {}: {e}", path.display()))
        })?;
        find_cik(&parse_tickers(&bytes)?, symbol)
    }

    async fn fetch_facts(&self, cik: &Cik) -> Result<RawFactsDocument> {
        let path = self.document_path(cik);
        debug!("Reading company facts from {}", path.display());

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FundamentalsError::DocumentNotFound(cik.to_string()));
            }
            Err(e) => {
                return Err(FundamentalsError::Other(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        RawFactsDocument::from_slice(&bytes)
    }
}
