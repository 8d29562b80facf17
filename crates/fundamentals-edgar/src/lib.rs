#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR company-facts sources.
//!
//! - [`EdgarSource`] - the `data.sec.gov` XBRL API, rate limited per SEC policy
//! - [`BulkDirectorySource`] - an unpacked nightly `companyfacts` archive
//!
//! # Example
//!
//! ```no_run
//! use fundamentals_core::{FactsSource, Symbol};
//! use fundamentals_edgar::EdgarSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = EdgarSource::new("MyApp/1.0 (contact@example.com)")?;
//!
//!     let doc = source.fetch_facts_for(&Symbol::new("META")).await?;
//!     println!("{:?}: {} facts", doc.entity_name, doc.fact_count());
//!
//!     Ok(())
//! }
//! ```

mod bulk;
mod tickers;

pub use bulk::BulkDirectorySource;

use async_trait::async_trait;
use fundamentals_core::{Cik, FactsSource, FundamentalsError, RawFactsDocument, Result, Symbol};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::tickers::{find_cik, parse_tickers};

/// SEC EDGAR API base URL
const EDGAR_BASE_URL: &str = "https://data.sec.gov";

/// SEC company tickers URL
const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// Default rate limit: 10 requests per second (SEC requirement)
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Spaces out requests so at most one starts per `min_interval`.
#[derive(Debug)]
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// Builds the company-facts URL for a CIK.
fn company_facts_url(cik: &Cik) -> String {
    format!("{EDGAR_BASE_URL}/api/xbrl/companyfacts/{}", cik.facts_file_name())
}

/// Company facts over the SEC EDGAR XBRL API.
///
/// SEC rejects anonymous clients, so every source carries an identifying
/// user agent. Requests are serialized through a shared rate limiter
/// (max 10 requests/second), including across clones.
#[derive(Debug, Clone)]
pub struct EdgarSource {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    user_agent: String,
}

impl EdgarSource {
    /// Creates a source with the given user agent.
    ///
    /// SEC expects the form `"AppName/Version (contact@email.com)"`.
    ///
    /// # Errors
    ///
    /// Returns [`FundamentalsError::Network`] if the HTTP client cannot be built.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FundamentalsError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, user_agent))
    }

    /// Creates a source around a pre-configured client.
    ///
    /// The client is responsible for sending `user_agent`; it is kept here
    /// for identification only.
    pub fn with_client(client: reqwest::Client, user_agent: &str) -> Self {
        Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(DEFAULT_RATE_LIMIT))),
            user_agent: user_agent.to_string(),
        }
    }

    /// User agent this source identifies itself with.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    async fn get_bytes(&self, url: &str, what: &str) -> Result<Vec<u8>> {
        self.rate_limiter.lock().await.wait().await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FundamentalsError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FundamentalsError::Network(format!(
                "Failed to fetch {what}: HTTP {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FundamentalsError::Network(e.to_string()))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl FactsSource for EdgarSource {
    fn name(&self) -> &str {
        "SEC EDGAR"
    }

    fn description(&self) -> &str {
        "XBRL company facts from the SEC EDGAR API"
    }

    async fn resolve_cik(&self, symbol: &Symbol) -> Result<Cik> {
        if symbol.is_numeric() {
            return Cik::parse(symbol.as_str());
        }

        debug!("Fetching company tickers from SEC");
        let bytes = self.get_bytes(COMPANY_TICKERS_URL, "company tickers").await?;
        let cik = find_cik(&parse_tickers(&bytes)?, symbol)?;
        debug!("Found CIK {} for ticker {}", cik, symbol);
        Ok(cik)
    }

    async fn fetch_facts(&self, cik: &Cik) -> Result<RawFactsDocument> {
        let url = company_facts_url(cik);

        debug!("Fetching company facts from {}", url);
        let what = format!("company facts for CIK {cik}");
        let bytes = self.get_bytes(&url, &what).await?;

        RawFactsDocument::from_slice(&bytes)
    }
}
