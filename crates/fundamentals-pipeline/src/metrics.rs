//! Derived ratio and valuation columns.

use fundamentals_core::{DerivedMetric, Formula, FundamentalsError, PipelineConfig, Result};
use tracing::debug;

use crate::table::FinancialTable;

/// Evaluates derived metrics row by row and appends them as columns.
///
/// Null operands propagate null, a zero or null denominator yields a null cell,
/// and a column the table does not have reads as all-null. Evaluation never
/// fails and never affects other rows or columns.
#[derive(Clone, Debug, Default)]
pub struct MetricsCalculator {
    metrics: Vec<DerivedMetric>,
}

impl MetricsCalculator {
    /// Creates a calculator for the given metrics, evaluated in order.
    #[must_use]
    pub const fn new(metrics: Vec<DerivedMetric>) -> Self {
        Self { metrics }
    }

    /// `valuation`, `ac/l` and `cf/l` with the given multiple, ratios rounded
    /// to two decimals.
    #[must_use]
    pub fn standard(multiplier: f64) -> Self {
        Self::new(DerivedMetric::standard(
            multiplier,
            fundamentals_core::config::DEFAULT_RATIO_DECIMALS,
        ))
    }

    /// The standard metrics plus the config's extra metrics.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.metrics())
    }

    /// Metrics in evaluation order.
    #[must_use]
    pub fn metrics(&self) -> &[DerivedMetric] {
        &self.metrics
    }

    /// Appends one column per metric. A metric may read columns produced by
    /// metrics evaluated before it.
    #[must_use]
    pub fn apply(&self, mut table: FinancialTable) -> FinancialTable {
        for metric in &self.metrics {
            let values = evaluate(&table, metric);
            table.set_column(&metric.name, values);
        }
        table
    }
}

/// Evaluates a metric for every row of a table.
#[must_use]
pub fn evaluate(table: &FinancialTable, metric: &DerivedMetric) -> Vec<Option<f64>> {
    let missing: Vec<&str> = metric
        .formula
        .inputs()
        .into_iter()
        .filter(|name| !table.has_column(name))
        .collect();
    if !missing.is_empty() {
        debug!(metric = %metric.name, ?missing, "Metric inputs absent, column will be null");
    }

    let cell = |values: Option<&[Option<f64>]>, row: usize| values.and_then(|v| v[row]);

    match &metric.formula {
        Formula::Linear { terms } => {
            let inputs: Vec<(f64, Option<&[Option<f64>]>)> = terms
                .iter()
                .map(|term| (term.coefficient, table.column(&term.column)))
                .collect();
            (0..table.height())
                .map(|row| {
                    inputs
                        .iter()
                        .map(|(coefficient, values)| cell(*values, row).map(|v| coefficient * v))
                        .sum::<Option<f64>>()
                        .filter(|v| v.is_finite())
                })
                .collect()
        }
        Formula::Ratio {
            numerator,
            denominator,
            decimals,
        } => {
            let num = table.column(numerator);
            let den = table.column(denominator);
            let mut undefined = 0usize;
            let values: Vec<Option<f64>> = (0..table.height())
                .map(|row| {
                    let ratio = checked_ratio(
                        numerator,
                        denominator,
                        cell(num, row),
                        cell(den, row),
                    )
                    .map(|r| decimals.map_or(r, |d| round_to(r, d)));
                    if ratio.is_err() {
                        undefined += 1;
                    }
                    ratio.ok()
                })
                .collect();
            if undefined > 0 {
                debug!(metric = %metric.name, rows = undefined, "Ratio undefined for some rows");
            }
            values
        }
    }
}

/// Divides two nullable operands.
///
/// Returns `DivisionUndefined` when either operand is null, the denominator is
/// zero, or the quotient is not finite.
pub fn checked_ratio(
    numerator_name: &str,
    denominator_name: &str,
    numerator: Option<f64>,
    denominator: Option<f64>,
) -> Result<f64> {
    let undefined = || FundamentalsError::DivisionUndefined {
        numerator: numerator_name.to_string(),
        denominator: denominator_name.to_string(),
    };

    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d)
            .filter(|q| q.is_finite())
            .ok_or_else(undefined),
        _ => Err(undefined()),
    }
}

/// Rounds to `decimals` places, ties to even.
#[must_use]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round_ties_even() / factor;
    if rounded.is_finite() { rounded } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundamentals_core::{AccountSeries, Term, columns};

    fn table(columns: &[(&str, &[(i32, f64)])]) -> FinancialTable {
        columns.iter().fold(FinancialTable::default(), |t, (name, pairs)| {
            t.outer_join(&AccountSeries::from_pairs(*name, pairs.iter().copied()))
        })
    }

    #[test]
    fn test_valuation_exact() {
        let input = table(&[
            (columns::CASH_FLOWS, &[(2022, 100.0)]),
            (columns::CASH, &[(2022, 50.0)]),
            (columns::LONG_TERM_DEBT, &[(2022, 30.0)]),
        ]);
        let output = MetricsCalculator::standard(20.0).apply(input);
        assert_eq!(output.value(2022, columns::VALUATION), Some(2020.0));
    }

    #[test]
    fn test_valuation_multiplier_is_configurable() {
        let input = table(&[
            (columns::CASH_FLOWS, &[(2022, 100.0)]),
            (columns::CASH, &[(2022, 50.0)]),
            (columns::LONG_TERM_DEBT, &[(2022, 30.0)]),
        ]);
        let output = MetricsCalculator::standard(10.0).apply(input);
        assert_eq!(output.value(2022, columns::VALUATION), Some(1020.0));
    }

    #[test]
    fn test_null_operand_propagates() {
        let input = table(&[
            (columns::CASH_FLOWS, &[(2021, 10.0), (2022, 100.0)]),
            (columns::CASH, &[(2022, 50.0)]),
            (columns::LONG_TERM_DEBT, &[(2021, 1.0), (2022, 30.0)]),
        ]);
        let output = MetricsCalculator::standard(20.0).apply(input);
        assert_eq!(output.value(2021, columns::VALUATION), None);
        assert_eq!(output.value(2022, columns::VALUATION), Some(2020.0));
    }

    #[test]
    fn test_zero_liabilities_only_nulls_that_row() {
        let input = table(&[
            (columns::CASH_FLOWS, &[(2021, 30.0), (2022, 50.0)]),
            (columns::ASSETS_CURRENT, &[(2021, 20.0), (2022, 40.0)]),
            (columns::LIABILITIES, &[(2021, 0.0), (2022, 30.0)]),
        ]);
        let output = MetricsCalculator::standard(20.0).apply(input);

        assert_eq!(output.value(2021, columns::ASSETS_CURRENT_TO_LIABILITIES), None);
        assert_eq!(output.value(2021, columns::CASH_FLOWS_TO_LIABILITIES), None);
        assert_eq!(
            output.value(2022, columns::ASSETS_CURRENT_TO_LIABILITIES),
            Some(1.33)
        );
        assert_eq!(output.value(2022, columns::CASH_FLOWS_TO_LIABILITIES), Some(1.67));
        // Inputs are untouched.
        assert_eq!(output.value(2021, columns::LIABILITIES), Some(0.0));
        assert_eq!(output.height(), 2);
    }

    #[test]
    fn test_absent_input_column_is_all_null() {
        let input = table(&[(columns::CASH, &[(2022, 50.0)])]);
        let output = MetricsCalculator::standard(20.0).apply(input);

        assert_eq!(
            output.column_names(),
            vec!["Cash", "valuation", "ac/l", "cf/l"]
        );
        assert_eq!(output.column(columns::VALUATION).unwrap(), &[None]);
        assert_eq!(output.column("ac/l").unwrap(), &[None]);
    }

    #[test]
    fn test_metrics_can_chain() {
        let input = table(&[("Assets", &[(2022, 10.0)]), ("Debt", &[(2022, 4.0)])]);
        let calculator = MetricsCalculator::new(vec![
            DerivedMetric {
                name: "net".to_string(),
                formula: Formula::Linear {
                    terms: vec![Term::new("Assets", 1.0), Term::new("Debt", -1.0)],
                },
            },
            DerivedMetric::ratio("net/assets", "net", "Assets", 1),
        ]);
        let output = calculator.apply(input);
        assert_eq!(output.value(2022, "net"), Some(6.0));
        assert_eq!(output.value(2022, "net/assets"), Some(0.6));
    }

    #[test]
    fn test_checked_ratio() {
        assert_eq!(checked_ratio("a", "b", Some(1.0), Some(4.0)).unwrap(), 0.25);
        assert!(matches!(
            checked_ratio("a", "b", Some(1.0), Some(0.0)),
            Err(FundamentalsError::DivisionUndefined { .. })
        ));
        assert!(checked_ratio("a", "b", None, Some(1.0)).is_err());
        assert!(checked_ratio("a", "b", Some(1.0), None).is_err());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-0.125, 2), -0.12);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
    }

    #[test]
    fn test_ratio_ties_round_to_even() {
        let input = table(&[
            (columns::CASH_FLOWS, &[(2022, 5.0)]),
            (columns::ASSETS_CURRENT, &[(2022, 1.0)]),
            (columns::LIABILITIES, &[(2022, 8.0)]),
        ]);
        let output = MetricsCalculator::standard(20.0).apply(input);

        assert_eq!(
            output.value(2022, columns::ASSETS_CURRENT_TO_LIABILITIES),
            Some(0.12)
        );
        assert_eq!(output.value(2022, columns::CASH_FLOWS_TO_LIABILITIES), Some(0.62));
    }
}
