//! Year-indexed financial table.

use fundamentals_core::{AccountSeries, FundamentalsError, Result, columns};
use polars::prelude::{Column, DataFrame, PlSmallStr};
use std::collections::{BTreeSet, HashMap};

/// A named column of nullable values, one per row.
#[derive(Clone, Debug, PartialEq)]
struct TableColumn {
    name: String,
    values: Vec<Option<f64>>,
}

/// Row-per-fiscal-year table of nullable numeric fields.
///
/// Rows are kept in ascending year order and years are unique. Columns keep
/// the order they were added in. A cell is `None` when the field has no value
/// for that year.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FinancialTable {
    years: Vec<i32>,
    columns: Vec<TableColumn>,
}

impl FinancialTable {
    /// Creates a single-column table from a series.
    #[must_use]
    pub fn from_series(series: &AccountSeries) -> Self {
        Self::default().outer_join(series)
    }

    /// Full outer join of a series on fiscal year.
    ///
    /// The resulting year set is the union of the table's and the series'
    /// years. Existing columns get `None` for newly added years; the new column
    /// gets `None` for years the series does not cover. If a column with the
    /// series' name already exists, the series' values overwrite it where
    /// present.
    #[must_use]
    pub fn outer_join(mut self, series: &AccountSeries) -> Self {
        let union: BTreeSet<i32> = self.years.iter().copied().chain(series.years()).collect();
        if union.len() != self.years.len() {
            let years: Vec<i32> = union.into_iter().collect();
            let index: HashMap<i32, usize> = self
                .years
                .iter()
                .enumerate()
                .map(|(i, year)| (*year, i))
                .collect();
            for column in &mut self.columns {
                column.values = years
                    .iter()
                    .map(|year| index.get(year).and_then(|&i| column.values[i]))
                    .collect();
            }
            self.years = years;
        }

        let values: Vec<Option<f64>> = self.years.iter().map(|&year| series.get(year)).collect();
        match self.columns.iter_mut().find(|c| c.name == series.account()) {
            Some(existing) => {
                for (slot, value) in existing.values.iter_mut().zip(values) {
                    if value.is_some() {
                        *slot = value;
                    }
                }
            }
            None => self.columns.push(TableColumn {
                name: series.account().to_string(),
                values,
            }),
        }
        self
    }

    /// Fiscal years, ascending.
    #[must_use]
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.years.len()
    }

    /// Number of columns, excluding the year key.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Column names in order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Returns true if the table has a column with this name.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Returns a column's values, one per row.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// `(name, values)` pairs in column order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> + '_ {
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), c.values.as_slice()))
    }

    /// Returns the cell for a year and column.
    #[must_use]
    pub fn value(&self, year: i32, column: &str) -> Option<f64> {
        let row = self.years.binary_search(&year).ok()?;
        self.column(column)?[row]
    }

    /// Renames a column. Returns false if `from` is absent or `to` is taken.
    pub(crate) fn rename_column(&mut self, from: &str, to: &str) -> bool {
        if from != to && self.has_column(to) {
            return false;
        }
        match self.columns.iter_mut().find(|c| c.name == from) {
            Some(column) => {
                column.name = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Removes a column. Returns false if it was absent.
    pub(crate) fn drop_column(&mut self, name: &str) -> bool {
        let before = self.columns.len();
        self.columns.retain(|c| c.name != name);
        self.columns.len() != before
    }

    /// Replaces a column's values, or appends the column.
    pub(crate) fn set_column(&mut self, name: &str, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.years.len());
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.values = values,
            None => self.columns.push(TableColumn {
                name: name.to_string(),
                values,
            }),
        }
    }

    /// Converts the table into a DataFrame with a leading `year` column.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut frame_columns = Vec::with_capacity(self.columns.len() + 1);
        frame_columns.push(Column::new(
            PlSmallStr::from(columns::YEAR),
            self.years.clone(),
        ));
        for column in &self.columns {
            frame_columns.push(Column::new(
                PlSmallStr::from(column.name.as_str()),
                column.values.clone(),
            ));
        }

        DataFrame::new(frame_columns).map_err(|e| FundamentalsError::Other(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(name: &str, pairs: &[(i32, f64)]) -> AccountSeries {
        AccountSeries::from_pairs(name, pairs.iter().copied())
    }

    #[test]
    fn test_outer_join_keeps_union_of_years() {
        let table = FinancialTable::from_series(&series("Assets", &[(2020, 1.0), (2021, 2.0)]))
            .outer_join(&series("Liabilities", &[(2022, 3.0)]));

        assert_eq!(table.years(), &[2020, 2021, 2022]);
        assert_eq!(table.column_names(), vec!["Assets", "Liabilities"]);
        assert_eq!(
            table.column("Assets").unwrap(),
            &[Some(1.0), Some(2.0), None]
        );
        assert_eq!(
            table.column("Liabilities").unwrap(),
            &[None, None, Some(3.0)]
        );
    }

    #[test]
    fn test_outer_join_inserts_years_in_order() {
        let table = FinancialTable::from_series(&series("A", &[(2019, 1.0), (2023, 5.0)]))
            .outer_join(&series("B", &[(2021, 3.0), (2019, 9.0)]));

        assert_eq!(table.years(), &[2019, 2021, 2023]);
        assert_eq!(table.value(2019, "B"), Some(9.0));
        assert_eq!(table.value(2021, "A"), None);
        assert_eq!(table.value(2023, "A"), Some(5.0));
        assert_eq!(table.value(2030, "A"), None);
    }

    #[test]
    fn test_join_same_name_overwrites_present_values() {
        let table = FinancialTable::from_series(&series("Cash", &[(2020, 1.0), (2021, 2.0)]))
            .outer_join(&series("Cash", &[(2021, 20.0)]));

        assert_eq!(table.width(), 1);
        assert_eq!(table.column("Cash").unwrap(), &[Some(1.0), Some(20.0)]);
    }

    #[test]
    fn test_rename_and_drop() {
        let mut table = FinancialTable::from_series(&series("A", &[(2020, 1.0)]))
            .outer_join(&series("B", &[(2020, 2.0)]));

        assert!(!table.rename_column("A", "B"));
        assert!(!table.rename_column("Z", "Y"));
        assert!(table.rename_column("A", "C"));
        assert_eq!(table.column_names(), vec!["C", "B"]);

        assert!(table.drop_column("B"));
        assert!(!table.drop_column("B"));
        assert_eq!(table.column_names(), vec!["C"]);
    }

    #[test]
    fn test_to_dataframe() {
        let table = FinancialTable::from_series(&series("Assets", &[(2020, 1.5), (2021, 2.5)]))
            .outer_join(&series("Liabilities", &[(2021, 4.0)]));

        let df = table.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);

        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["year", "Assets", "Liabilities"]);

        let liabilities = df
            .column("Liabilities")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .clone();
        assert_eq!(liabilities.get(0), None);
        assert_eq!(liabilities.get(1), Some(4.0));
    }
}
