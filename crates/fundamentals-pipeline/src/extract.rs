//! Annual series extraction from a raw facts document.

use fundamentals_core::{
    AccountFacts, AccountSeries, FundamentalsError, PipelineConfig, RawFactsDocument, Result,
};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// The only unit bucket the extractor reads.
pub const REPORTING_UNIT: &str = "USD";

/// Series for the requested accounts plus the gaps absorbed along the way.
#[derive(Debug, Default)]
pub struct Extraction {
    /// One series per distinct requested account, in request order. Gaps are
    /// represented by empty series.
    pub series: Vec<AccountSeries>,
    /// Recoverable errors (`MissingAccount`, `UnsupportedCurrency`) for the
    /// accounts that came back empty.
    pub gaps: Vec<FundamentalsError>,
}

/// Pulls one annual time series per account out of a facts document.
#[derive(Clone, Debug)]
pub struct AccountExtractor {
    taxonomies: Vec<String>,
    aliases: BTreeMap<String, Vec<String>>,
}

impl AccountExtractor {
    /// Creates an extractor trying `taxonomies` in order.
    #[must_use]
    pub fn new<I, S>(taxonomies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taxonomies: taxonomies.into_iter().map(Into::into).collect(),
            aliases: BTreeMap::new(),
        }
    }

    /// Creates an extractor from the taxonomy order and aliases of a config.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            taxonomies: config.taxonomies.clone(),
            aliases: config.aliases.clone(),
        }
    }

    /// Adds alternate element names tried when `account` yields nothing.
    #[must_use]
    pub fn with_aliases<I, S>(mut self, account: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases
            .insert(account.into(), aliases.into_iter().map(Into::into).collect());
        self
    }

    /// Extracts the annual series for an account.
    ///
    /// Returns `MissingAccount` when neither the account nor any of its aliases
    /// carries annual USD facts, and `UnsupportedCurrency` when the account only
    /// reports in other units. On success the series is labelled with
    /// `account`, even if an alias supplied the values.
    pub fn try_extract(&self, doc: &RawFactsDocument, account: &str) -> Result<AccountSeries> {
        let aliases = self.aliases.get(account).map(Vec::as_slice).unwrap_or(&[]);
        let mut first_gap = None;

        for element in std::iter::once(account).chain(aliases.iter().map(String::as_str)) {
            match self.extract_element(doc, element) {
                Ok(series) => {
                    if element != account {
                        debug!(account, alias = element, "Using alias for account");
                    }
                    return Ok(series.with_account(account));
                }
                Err(e) if e.is_recoverable() => {
                    if first_gap.is_none() {
                        first_gap = Some(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(first_gap.unwrap_or_else(|| FundamentalsError::MissingAccount {
            account: account.to_string(),
        }))
    }

    /// Extracts the annual series for an account, turning recoverable gaps into
    /// an empty series.
    pub fn extract(&self, doc: &RawFactsDocument, account: &str) -> Result<AccountSeries> {
        match self.try_extract(doc, account) {
            Ok(series) => Ok(series),
            Err(e) if e.is_recoverable() => {
                debug!(account, reason = %e, "Account contributes no column");
                Ok(AccountSeries::empty(account))
            }
            Err(e) => Err(e),
        }
    }

    /// Extracts every requested account, skipping repeated names.
    pub fn extract_all(&self, doc: &RawFactsDocument, accounts: &[String]) -> Result<Extraction> {
        let mut seen = HashSet::new();
        let mut extraction = Extraction::default();

        match self.resolve_taxonomy(doc) {
            Some(taxonomy) => debug!(taxonomy, "Reading accounts"),
            None => warn!(taxonomies = ?self.taxonomies, "No configured taxonomy in document"),
        }

        for account in accounts {
            if !seen.insert(account.as_str()) {
                debug!(account = %account, "Skipping repeated account");
                continue;
            }
            match self.try_extract(doc, account) {
                Ok(series) => extraction.series.push(series),
                Err(e) if e.is_recoverable() => {
                    match &e {
                        FundamentalsError::UnsupportedCurrency { .. } => {
                            warn!(account = %account, reason = %e, "Account skipped");
                        }
                        _ => debug!(account = %account, reason = %e, "Account skipped"),
                    }
                    extraction.series.push(AccountSeries::empty(account.as_str()));
                    extraction.gaps.push(e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(extraction)
    }

    /// First taxonomy, in configured order, present in the document.
    ///
    /// Every account of a document is read from this one taxonomy; an account
    /// it lacks is missing even if a later taxonomy carries it.
    #[must_use]
    pub fn resolve_taxonomy(&self, doc: &RawFactsDocument) -> Option<&str> {
        self.taxonomies
            .iter()
            .map(String::as_str)
            .find(|taxonomy| doc.taxonomy(taxonomy).is_some())
    }

    fn locate<'a>(&self, doc: &'a RawFactsDocument, element: &str) -> Option<&'a AccountFacts> {
        doc.account(self.resolve_taxonomy(doc)?, element)
    }

    fn extract_element(&self, doc: &RawFactsDocument, element: &str) -> Result<AccountSeries> {
        let missing = || FundamentalsError::MissingAccount {
            account: element.to_string(),
        };

        let facts = self.locate(doc, element).ok_or_else(missing)?;
        let Some(records) = facts.unit(REPORTING_UNIT) else {
            let units = facts.unit_names();
            if units.is_empty() {
                return Err(missing());
            }
            return Err(FundamentalsError::UnsupportedCurrency {
                account: element.to_string(),
                units,
            });
        };

        // Later records overwrite earlier ones: the most recent filing wins.
        let mut series = AccountSeries::empty(element);
        for record in records.iter().filter(|r| r.is_annual()) {
            match record.end_year() {
                Ok(year) => {
                    series.insert(year, record.val);
                }
                Err(e) => warn!(account = element, error = %e, "Skipping fact"),
            }
        }

        if series.is_empty() {
            return Err(missing());
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> RawFactsDocument {
        RawFactsDocument::from_value(json!({
            "facts": {
                "us-gaap": {
                    "Liabilities": {"units": {"USD": [
                        {"end": "2021-12-31", "val": 100, "fy": 2021, "fp": "FY", "form": "10-K"},
                        {"end": "2022-03-31", "val": 110, "fy": 2022, "fp": "Q1", "form": "10-Q"},
                        {"end": "2022-12-31", "val": 120, "fy": 2022, "fp": "FY", "form": "10-K"},
                        {"end": "2021-12-31", "val": 105, "fy": 2022, "fp": "FY", "form": "10-K"},
                        {"end": "2023-12-31", "val": 130, "fy": 2023, "fp": "FY", "form": "10-K"}
                    ]}},
                    "Revenues": {"units": {"USD": [
                        {"end": "2022-06-30", "val": 10, "fy": 2022, "fp": "Q2", "form": "10-Q"}
                    ]}},
                    "AssetsCurrent": {"units": {"EUR": [
                        {"end": "2022-12-31", "val": 55, "fy": 2022, "fp": "FY"}
                    ]}},
                    "StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest": {"units": {"USD": [
                        {"end": "2022-12-31", "val": 70, "fy": 2022, "fp": "FY"}
                    ]}}
                },
                "ifrs-full": {
                    "Liabilities": {"units": {"USD": [
                        {"end": "2022-12-31", "val": 999, "fy": 2022, "fp": "FY"}
                    ]}},
                    "Revenue": {"units": {"USD": [
                        {"end": "2020-12-31", "val": 42, "fy": 2020, "fp": "FY"},
                        {"end": "bad-date", "val": 43, "fy": 2021, "fp": "FY"}
                    ]}}
                }
            }
        }))
        .unwrap()
    }

    fn extractor() -> AccountExtractor {
        AccountExtractor::new(["us-gaap", "ifrs-full"])
    }

    #[test]
    fn test_annual_only_last_record_wins() {
        let series = extractor().try_extract(&document(), "Liabilities").unwrap();

        assert_eq!(series.account(), "Liabilities");
        assert_eq!(series.years().collect::<Vec<_>>(), vec![2021, 2022, 2023]);
        // Restated 2021 value filed later replaces the original.
        assert_eq!(series.get(2021), Some(105.0));
        // The Q1 filing never shows up.
        assert_eq!(series.get(2022), Some(120.0));
    }

    #[test]
    fn test_first_taxonomy_wins() {
        let series = extractor().try_extract(&document(), "Liabilities").unwrap();
        assert_ne!(series.get(2022), Some(999.0));

        let ifrs_first = AccountExtractor::new(["ifrs-full", "us-gaap"]);
        let series = ifrs_first.try_extract(&document(), "Liabilities").unwrap();
        assert_eq!(series.get(2022), Some(999.0));
    }

    #[test]
    fn test_taxonomy_is_chosen_per_document() {
        // us-gaap is present, so an account only ifrs-full carries is missing.
        let err = extractor().try_extract(&document(), "Revenue").unwrap_err();
        assert!(matches!(
            err,
            FundamentalsError::MissingAccount { ref account } if account == "Revenue"
        ));
        assert_eq!(extractor().resolve_taxonomy(&document()), Some("us-gaap"));
    }

    #[test]
    fn test_falls_back_to_next_present_taxonomy() {
        let extractor = AccountExtractor::new(["dei", "ifrs-full", "us-gaap"]);
        assert_eq!(extractor.resolve_taxonomy(&document()), Some("ifrs-full"));

        let series = extractor.try_extract(&document(), "Revenue").unwrap();
        // The unparseable record is skipped, not fatal.
        assert_eq!(series.iter().collect::<Vec<_>>(), vec![(2020, 42.0)]);
    }

    #[test]
    fn test_quarterly_only_is_missing() {
        let err = extractor().try_extract(&document(), "Revenues").unwrap_err();
        assert!(matches!(err, FundamentalsError::MissingAccount { .. }));
    }

    #[test]
    fn test_absent_account_is_missing() {
        let err = extractor().try_extract(&document(), "Goodwill").unwrap_err();
        assert!(matches!(
            err,
            FundamentalsError::MissingAccount { ref account } if account == "Goodwill"
        ));

        let no_taxonomy = AccountExtractor::new(["dei"]);
        assert!(no_taxonomy.try_extract(&document(), "Liabilities").is_err());
    }

    #[test]
    fn test_non_usd_is_unsupported_currency() {
        let err = extractor().try_extract(&document(), "AssetsCurrent").unwrap_err();
        match err {
            FundamentalsError::UnsupportedCurrency { account, units } => {
                assert_eq!(account, "AssetsCurrent");
                assert_eq!(units, vec!["EUR"]);
            }
            other => panic!("unexpected error: {other}"),
        }

        let series = extractor().extract(&document(), "AssetsCurrent").unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_alias_fallback_keeps_primary_name() {
        let extractor = extractor().with_aliases(
            "StockholdersEquity",
            ["StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest"],
        );
        let series = extractor
            .try_extract(&document(), "StockholdersEquity")
            .unwrap();
        assert_eq!(series.account(), "StockholdersEquity");
        assert_eq!(series.get(2022), Some(70.0));
    }

    #[test]
    fn test_from_config_uses_configured_aliases() {
        let extractor = AccountExtractor::from_config(&PipelineConfig::default());
        let series = extractor
            .try_extract(&document(), "StockholdersEquity")
            .unwrap();
        assert_eq!(series.get(2022), Some(70.0));
    }

    #[test]
    fn test_extract_all_reports_gaps() {
        let accounts: Vec<String> = ["Revenues", "Liabilities", "AssetsCurrent", "Liabilities"]
            .into_iter()
            .map(String::from)
            .collect();
        let extraction = extractor().extract_all(&document(), &accounts).unwrap();

        let names: Vec<&str> = extraction.series.iter().map(|s| s.account()).collect();
        assert_eq!(names, vec!["Revenues", "Liabilities", "AssetsCurrent"]);
        assert!(extraction.series[0].is_empty());
        assert!(!extraction.series[1].is_empty());
        assert!(extraction.series[2].is_empty());

        assert_eq!(extraction.gaps.len(), 2);
        assert!(matches!(
            extraction.gaps[0],
            FundamentalsError::MissingAccount { .. }
        ));
        assert!(matches!(
            extraction.gaps[1],
            FundamentalsError::UnsupportedCurrency { .. }
        ));
    }
}
