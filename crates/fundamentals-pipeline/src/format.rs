//! Human-readable magnitudes for presentation.
//!
//! Formatting is terminal: a [`DisplayTable`] holds [`DisplayValue`]s and offers
//! no way back to a [`FinancialTable`], so no arithmetic can run on rendered
//! cells.

use fundamentals_core::{RenderConfig, Threshold};
use std::fmt;

use crate::table::FinancialTable;

/// A rendered cell.
///
/// Values at or above the smallest threshold become suffixed strings; smaller
/// values pass through unchanged.
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayValue {
    /// Scaled and suffixed, e.g. `"4.56B"`.
    Scaled(String),
    /// Below every threshold; the unscaled value.
    Raw(f64),
    /// No value for this cell.
    Null,
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scaled(s) => f.write_str(s),
            Self::Raw(v) => write!(f, "{v}"),
            Self::Null => f.write_str("NaN"),
        }
    }
}

/// Renders magnitudes with `T`/`B`/`M`-style suffixes.
#[derive(Clone, Debug)]
pub struct Formatter {
    thresholds: Vec<Threshold>,
    decimals: usize,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

impl Formatter {
    /// Creates a formatter; thresholds are sorted largest first.
    #[must_use]
    pub fn new(config: &RenderConfig) -> Self {
        let mut thresholds = config.thresholds.clone();
        thresholds.sort_by(|a, b| b.value.total_cmp(&a.value));
        Self {
            thresholds,
            decimals: config.decimals,
        }
    }

    /// Formats a single value. The comparison uses the absolute value, so the
    /// sign carries into the scaled string.
    #[must_use]
    pub fn format(&self, value: f64) -> DisplayValue {
        self.thresholds
            .iter()
            .find(|t| value.abs() >= t.value)
            .map_or(DisplayValue::Raw(value), |t| {
                DisplayValue::Scaled(format!(
                    "{:.*}{}",
                    self.decimals,
                    value / t.value,
                    t.suffix
                ))
            })
    }

    /// Formats a nullable cell.
    #[must_use]
    pub fn format_cell(&self, value: Option<f64>) -> DisplayValue {
        value.map_or(DisplayValue::Null, |v| self.format(v))
    }

    /// Renders every cell of a table. Years stay as row keys.
    #[must_use]
    pub fn render(&self, table: &FinancialTable) -> DisplayTable {
        DisplayTable {
            years: table.years().to_vec(),
            columns: table
                .columns()
                .map(|(name, values)| {
                    (
                        name.to_string(),
                        values.iter().map(|v| self.format_cell(*v)).collect(),
                    )
                })
                .collect(),
        }
    }
}

/// A fully rendered table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayTable {
    years: Vec<i32>,
    columns: Vec<(String, Vec<DisplayValue>)>,
}

impl DisplayTable {
    /// Fiscal years, ascending.
    #[must_use]
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Column names in order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Returns a column's rendered cells.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[DisplayValue]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Returns the rendered cell for a year and column.
    #[must_use]
    pub fn value(&self, year: i32, column: &str) -> Option<&DisplayValue> {
        let row = self.years.binary_search(&year).ok()?;
        self.column(column)?.get(row)
    }

    /// Rows as `(year, cells)` in column order.
    pub fn rows(&self) -> impl Iterator<Item = (i32, Vec<&DisplayValue>)> + '_ {
        self.years.iter().enumerate().map(|(row, year)| {
            (
                *year,
                self.columns.iter().map(|(_, values)| &values[row]).collect(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundamentals_core::AccountSeries;

    fn scaled(s: &str) -> DisplayValue {
        DisplayValue::Scaled(s.to_string())
    }

    #[test]
    fn test_format_values() {
        let formatter = Formatter::default();
        assert_eq!(formatter.format(1_230_000_000_000.0), scaled("1.23T"));
        assert_eq!(formatter.format(4_560_000_000.0), scaled("4.56B"));
        assert_eq!(formatter.format(7_890_000.0), scaled("7.89M"));
        assert_eq!(formatter.format(123.0), DisplayValue::Raw(123.0));
        assert_eq!(formatter.format(-7_890_000_000.0), scaled("-7.89B"));
    }

    #[test]
    fn test_threshold_boundaries() {
        let formatter = Formatter::default();
        assert_eq!(formatter.format(1e6), scaled("1.00M"));
        assert_eq!(formatter.format(999_999.0), DisplayValue::Raw(999_999.0));
        assert_eq!(formatter.format(-1e12), scaled("-1.00T"));
        assert_eq!(formatter.format(0.5), DisplayValue::Raw(0.5));
    }

    #[test]
    fn test_display() {
        let formatter = Formatter::default();
        assert_eq!(formatter.format(123.0).to_string(), "123");
        assert_eq!(formatter.format(1.23).to_string(), "1.23");
        assert_eq!(formatter.format(4_560_000_000.0).to_string(), "4.56B");
        assert_eq!(formatter.format_cell(None).to_string(), "NaN");
    }

    #[test]
    fn test_custom_render_config() {
        let formatter = Formatter::new(&RenderConfig {
            thresholds: vec![Threshold::new(1e3, "K"), Threshold::new(1e6, "M")],
            decimals: 1,
        });
        assert_eq!(formatter.format(2_500_000.0), scaled("2.5M"));
        assert_eq!(formatter.format(2_500.0), scaled("2.5K"));
        assert_eq!(formatter.format(25.0), DisplayValue::Raw(25.0));
    }

    #[test]
    fn test_render_table() {
        let table = FinancialTable::from_series(&AccountSeries::from_pairs(
            "Cash",
            [(2021, 4_560_000_000.0), (2022, 12.0)],
        ))
        .outer_join(&AccountSeries::from_pairs("ac/l", [(2022, 1.5)]));

        let rendered = Formatter::default().render(&table);
        assert_eq!(rendered.years(), &[2021, 2022]);
        assert_eq!(rendered.column_names(), vec!["Cash", "ac/l"]);
        assert_eq!(rendered.value(2021, "Cash"), Some(&scaled("4.56B")));
        assert_eq!(rendered.value(2021, "ac/l"), Some(&DisplayValue::Null));
        assert_eq!(rendered.value(2022, "ac/l"), Some(&DisplayValue::Raw(1.5)));

        let rows: Vec<(i32, Vec<String>)> = rendered
            .rows()
            .map(|(year, cells)| (year, cells.iter().map(|c| c.to_string()).collect()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (2021, vec!["4.56B".to_string(), "NaN".to_string()]),
                (2022, vec!["12".to_string(), "1.5".to_string()]),
            ]
        );
    }
}
