//! Company identifiers.
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`Cik`] - SEC Central Index Key, zero-padded to ten digits

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{FundamentalsError, Result};

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the symbol is all ASCII digits, i.e. already a CIK.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        !self.0.is_empty() && self.0.bytes().all(|b| b.is_ascii_digit())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// SEC Central Index Key.
///
/// Always stored zero-padded to ten digits, the form used in EDGAR URLs and
/// bulk file names (`CIK0000320193.json`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cik(String);

impl Cik {
    /// Width of a padded CIK.
    pub const WIDTH: usize = 10;

    /// Creates a CIK from its numeric value.
    #[must_use]
    pub fn from_number(n: u64) -> Self {
        Self(format!("{n:0>width$}", width = Self::WIDTH))
    }

    /// Parses a CIK from a string of at most ten digits, padding it.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty()
            || trimmed.len() > Self::WIDTH
            || !trimmed.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(FundamentalsError::InvalidParameter(format!(
                "Invalid CIK: {s:?}"
            )));
        }
        Ok(Self(format!("{trimmed:0>width$}", width = Self::WIDTH)))
    }

    /// Returns the padded CIK.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of this company's facts document in an EDGAR bulk dump.
    #[must_use]
    pub fn facts_file_name(&self) -> String {
        format!("CIK{}.json", self.0)
    }
}

impl fmt::Display for Cik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Cik {
    type Err = FundamentalsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_creation() {
        let symbol = Symbol::new(" meta ");
        assert_eq!(symbol.as_str(), "META");
        assert!(!symbol.is_numeric());
        assert!(Symbol::new("1326801").is_numeric());
    }

    #[test]
    fn test_cik_padding() {
        let cik = Cik::from_number(320193);
        assert_eq!(cik.as_str(), "0000320193");
        assert_eq!(cik.as_str().len(), Cik::WIDTH);
        assert_eq!(Cik::parse("320193").unwrap(), cik);
        assert_eq!(cik.facts_file_name(), "CIK0000320193.json");
    }

    #[test]
    fn test_cik_rejects_garbage() {
        assert!(Cik::parse("").is_err());
        assert!(Cik::parse("AAPL").is_err());
        assert!(Cik::parse("12345678901").is_err());
    }
}
