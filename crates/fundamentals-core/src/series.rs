//! Annual time series for a single account.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fiscal year → value for exactly one account.
///
/// An empty series is a valid state meaning "this account contributes nothing".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountSeries {
    account: String,
    values: BTreeMap<i32, f64>,
}

impl AccountSeries {
    /// Creates an empty series for an account.
    #[must_use]
    pub fn empty(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            values: BTreeMap::new(),
        }
    }

    /// Creates a series from `(year, value)` pairs. A later pair for the same
    /// year replaces an earlier one.
    #[must_use]
    pub fn from_pairs(account: impl Into<String>, pairs: impl IntoIterator<Item = (i32, f64)>) -> Self {
        Self {
            account: account.into(),
            values: pairs.into_iter().collect(),
        }
    }

    /// The account this series belongs to.
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Inserts a value, replacing any previous value for the year.
    pub fn insert(&mut self, year: i32, value: f64) -> Option<f64> {
        self.values.insert(year, value)
    }

    /// Returns the value for a year.
    #[must_use]
    pub fn get(&self, year: i32) -> Option<f64> {
        self.values.get(&year).copied()
    }

    /// Number of years with a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no year has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.values.keys().copied()
    }

    /// `(year, value)` pairs in ascending year order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.values.iter().map(|(y, v)| (*y, *v))
    }

    /// Relabels the series, keeping its values.
    #[must_use]
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_pair_wins() {
        let series = AccountSeries::from_pairs("Cash", [(2022, 1.0), (2021, 3.0), (2022, 2.0)]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.get(2022), Some(2.0));
        assert_eq!(series.years().collect::<Vec<_>>(), vec![2021, 2022]);
    }

    #[test]
    fn test_empty_series() {
        let series = AccountSeries::empty("Revenues");
        assert!(series.is_empty());
        assert_eq!(series.account(), "Revenues");
        assert_eq!(series.get(2020), None);
    }
}
