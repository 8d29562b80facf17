//! Filling unreported values from other accounts.

use fundamentals_core::{DerivedMetric, PipelineConfig, RawFactsDocument, Result};
use tracing::debug;

use crate::{extract::AccountExtractor, metrics::evaluate, table::FinancialTable};

/// Fills a column's null cells with a formula over other columns.
///
/// Runs after renames and before metrics. An input the table lacks is read
/// from the document for the table's years only, so filling never adds rows
/// and leaves no input column behind. Reported values are never replaced.
#[derive(Clone, Debug, Default)]
pub struct ColumnFiller {
    fallbacks: Vec<DerivedMetric>,
}

impl ColumnFiller {
    /// Creates a filler; each fallback's name is the column it fills.
    #[must_use]
    pub const fn new(fallbacks: Vec<DerivedMetric>) -> Self {
        Self { fallbacks }
    }

    /// Creates a filler from the config's fallbacks.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.fallbacks.clone())
    }

    /// Fallbacks in application order.
    #[must_use]
    pub fn fallbacks(&self) -> &[DerivedMetric] {
        &self.fallbacks
    }

    /// Fills null cells of every fallback column.
    pub fn apply(
        &self,
        doc: &RawFactsDocument,
        extractor: &AccountExtractor,
        mut table: FinancialTable,
    ) -> Result<FinancialTable> {
        for fallback in &self.fallbacks {
            let current: Vec<Option<f64>> = table
                .column(&fallback.name)
                .map_or_else(|| vec![None; table.height()], <[Option<f64>]>::to_vec);
            if current.iter().all(Option::is_some) {
                continue;
            }

            let mut inputs = table.clone();
            for input in fallback.formula.inputs() {
                if inputs.has_column(input) {
                    continue;
                }
                let series = extractor.extract(doc, input)?;
                let values: Vec<Option<f64>> =
                    inputs.years().iter().map(|&year| series.get(year)).collect();
                inputs.set_column(input, values);
            }

            let mut filled = 0usize;
            let values: Vec<Option<f64>> = current
                .into_iter()
                .zip(evaluate(&inputs, fallback))
                .map(|(reported, derived)| {
                    if reported.is_none() && derived.is_some() {
                        filled += 1;
                    }
                    reported.or(derived)
                })
                .collect();

            if filled > 0 {
                debug!(column = %fallback.name, rows = filled, "Filled unreported values");
                table.set_column(&fallback.name, values);
            }
        }
        Ok(table)
    }
}
