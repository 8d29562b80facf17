//! SEC `company_tickers.json` parsing.
//!
//! The file maps an arbitrary index to `{cik_str, ticker, title}`:
//!
//! ```text
//! {"0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."}, ...}
//! ```

use fundamentals_core::{Cik, FundamentalsError, Result, Symbol};
use serde::Deserialize;
use std::collections::HashMap;

/// Company ticker information from SEC JSON.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CompanyTickerInfo {
    /// CIK as a number (SEC returns this as an integer)
    cik_str: u64,
    /// Ticker symbol
    ticker: String,
    /// Company name
    #[allow(dead_code)]
    title: String,
}

/// Parses the ticker file.
pub(crate) fn parse_tickers(bytes: &[u8]) -> Result<Vec<CompanyTickerInfo>> {
    let data: HashMap<String, CompanyTickerInfo> = serde_json::from_slice(bytes)
        .map_err(|e| FundamentalsError::Parse(format!("Failed to parse company tickers: {e}")))?;
    Ok(data.into_values().collect())
}

/// Finds the CIK for a ticker, case-insensitively.
pub(crate) fn find_cik(companies: &[CompanyTickerInfo], symbol: &Symbol) -> Result<Cik> {
    if symbol.as_str().is_empty() {
        return Err(FundamentalsError::InvalidParameter(
            "Empty ticker".to_string(),
        ));
    }

    companies
        .iter()
        .find(|c| c.ticker.eq_ignore_ascii_case(symbol.as_str()))
        .map(|c| Cik::from_number(c.cik_str))
        .ok_or_else(|| FundamentalsError::SymbolNotFound(symbol.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICKERS: &str = r#"{
        "0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."},
        "1": {"cik_str": 1326801, "ticker": "META", "title": "Meta Platforms, Inc."}
    }"#;

    #[test]
    fn test_find_cik() {
        let companies = parse_tickers(TICKERS.as_bytes()).unwrap();
        assert_eq!(companies.len(), 2);

        let cik = find_cik(&companies, &Symbol::new("meta")).unwrap();
        assert_eq!(cik.as_str(), "0001326801");
    }

    #[test]
    fn test_unknown_and_empty_ticker() {
        let companies = parse_tickers(TICKERS.as_bytes()).unwrap();
        assert!(matches!(
            find_cik(&companies, &Symbol::new("NOPE")),
            Err(FundamentalsError::SymbolNotFound(_))
        ));
        assert!(matches!(
            find_cik(&companies, &Symbol::new("")),
            Err(FundamentalsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_bad_ticker_file() {
        assert!(matches!(
            parse_tickers(b"[1, 2, 3]"),
            Err(FundamentalsError::Parse(_))
        ));
    }
}
