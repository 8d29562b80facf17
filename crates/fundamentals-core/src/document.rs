//! Raw XBRL facts document.
//!
//! The document mirrors the EDGAR "company facts" JSON:
//!
//! ```text
//! { "cik": 1326801, "entityName": "...",
//!   "facts": { "us-gaap": { "Liabilities": { "units": { "USD": [ {fact}, ... ] } } } } }
//! ```
//!
//! It is deserialized once and never mutated; fact records keep document order.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{FundamentalsError, Result};

/// Fiscal period tag marking an annual record.
pub const ANNUAL_PERIOD: &str = "FY";

/// Date format of `start`/`end` in fact records.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Accounts of one taxonomy, keyed by element name.
pub type Taxonomy = HashMap<String, AccountFacts>;

/// A company's facts, keyed by taxonomy (`us-gaap`, `ifrs-full`, `dei`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFactsDocument {
    /// CIK number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cik: Option<u64>,
    /// Entity name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    /// Facts organized by taxonomy and element.
    pub facts: HashMap<String, Taxonomy>,
}

impl RawFactsDocument {
    /// Parses a document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FundamentalsError::MalformedDocument(e.to_string()))
    }

    /// Parses a document from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| FundamentalsError::MalformedDocument(e.to_string()))
    }

    /// Converts an already-parsed JSON value into a document.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| FundamentalsError::MalformedDocument(e.to_string()))
    }

    /// Returns the accounts of a taxonomy, if the document carries it.
    #[must_use]
    pub fn taxonomy(&self, name: &str) -> Option<&Taxonomy> {
        self.facts.get(name)
    }

    /// Returns an account within a taxonomy.
    #[must_use]
    pub fn account(&self, taxonomy: &str, account: &str) -> Option<&AccountFacts> {
        self.taxonomy(taxonomy)?.get(account)
    }

    /// Total number of fact records across all taxonomies, accounts and units.
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.facts
            .values()
            .flat_map(|taxonomy| taxonomy.values())
            .flat_map(|account| account.units.values())
            .map(Vec::len)
            .sum()
    }
}

/// Facts for a single XBRL element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountFacts {
    /// Label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unit buckets (`USD`, `EUR`, `shares`, ...) of fact records in document order.
    #[serde(default)]
    pub units: HashMap<String, Vec<FactRecord>>,
}

impl AccountFacts {
    /// Returns the records of a unit bucket.
    #[must_use]
    pub fn unit(&self, unit: &str) -> Option<&[FactRecord]> {
        self.units.get(unit).map(Vec::as_slice)
    }

    /// Unit bucket names, sorted.
    #[must_use]
    pub fn unit_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.units.keys().cloned().collect();
        names.sort();
        names
    }
}

/// One reported value for one element, one period, from one filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRecord {
    /// Start date of a duration period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// End date of the period.
    pub end: String,
    /// Reported value.
    pub val: f64,
    /// Accession number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accn: Option<String>,
    /// Fiscal year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fy: Option<i32>,
    /// Fiscal period (`FY`, `Q1`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fp: Option<String>,
    /// Form type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    /// Filed date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filed: Option<String>,
    /// Frame (instant or duration).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<String>,
}

impl FactRecord {
    /// Creates a record with just the fields the pipeline reads.
    #[must_use]
    pub fn new(end: impl Into<String>, val: f64, fp: impl Into<String>) -> Self {
        Self {
            start: None,
            end: end.into(),
            val,
            accn: None,
            fy: None,
            fp: Some(fp.into()),
            form: None,
            filed: None,
            frame: None,
        }
    }

    /// Returns true if the record is tagged with the annual fiscal period.
    #[must_use]
    pub fn is_annual(&self) -> bool {
        self.fp.as_deref() == Some(ANNUAL_PERIOD)
    }

    /// Parses the period end date.
    pub fn end_date(&self) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.end, DATE_FORMAT)
            .map_err(|e| FundamentalsError::Parse(format!("Bad period end {:?}: {e}", self.end)))
    }

    /// Calendar year of the period end date.
    pub fn end_year(&self) -> Result<i32> {
        self.end_date().map(|d| d.year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "cik": 1326801,
            "entityName": "Meta Platforms, Inc.",
            "facts": {
                "us-gaap": {
                    "Liabilities": {
                        "label": "Liabilities",
                        "units": {
                            "USD": [
                                {"end": "2022-12-31", "val": 125713000000i64, "fy": 2022, "fp": "FY", "form": "10-K", "accn": "0001326801-23-000013"},
                                {"end": "2023-03-31", "val": 127000000000i64, "fy": 2023, "fp": "Q1", "form": "10-Q"}
                            ]
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn test_parse_document() {
        let doc = RawFactsDocument::from_value(sample()).unwrap();
        assert_eq!(doc.cik, Some(1326801));
        assert_eq!(doc.entity_name.as_deref(), Some("Meta Platforms, Inc."));
        assert_eq!(doc.fact_count(), 2);

        let records = doc
            .account("us-gaap", "Liabilities")
            .and_then(|a| a.unit("USD"))
            .unwrap();
        assert!(records[0].is_annual());
        assert!(!records[1].is_annual());
        assert_eq!(records[0].end_year().unwrap(), 2022);
        assert_eq!(records[0].val, 125_713_000_000.0);
    }

    #[test]
    fn test_missing_facts_is_malformed() {
        let err = RawFactsDocument::from_json(r#"{"cik": 1, "entityName": "x"}"#).unwrap_err();
        assert!(matches!(err, FundamentalsError::MalformedDocument(_)));
    }

    #[test]
    fn test_wrong_nesting_is_malformed() {
        let err = RawFactsDocument::from_json(r#"{"facts": {"us-gaap": [1, 2, 3]}}"#).unwrap_err();
        assert!(matches!(err, FundamentalsError::MalformedDocument(_)));

        let err = RawFactsDocument::from_json("not json").unwrap_err();
        assert!(matches!(err, FundamentalsError::MalformedDocument(_)));
    }

    #[test]
    fn test_empty_facts_is_valid() {
        let doc = RawFactsDocument::from_json(r#"{"facts": {}}"#).unwrap();
        assert!(doc.taxonomy("us-gaap").is_none());
        assert_eq!(doc.fact_count(), 0);
    }

    #[test]
    fn test_bad_end_date() {
        let record = FactRecord::new("31/12/2022", 1.0, "FY");
        assert!(matches!(
            record.end_year(),
            Err(FundamentalsError::Parse(_))
        ));
    }
}
