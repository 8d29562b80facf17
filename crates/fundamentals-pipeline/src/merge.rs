//! Outer join of account series into one table.

use fundamentals_core::{AccountSeries, FundamentalsError, Result};
use tracing::debug;

use crate::table::FinancialTable;

/// Merges series into a table keyed by fiscal year.
///
/// Empty series are discarded before the merge base is chosen, so an
/// unreported first account never sinks the merge. The remaining series are
/// folded with a full outer join: the row set is the union of all years.
///
/// Returns `EmptyResult` when every series is empty.
pub fn merge_series(series: &[AccountSeries]) -> Result<FinancialTable> {
    let mut reported = series.iter().filter(|s| !s.is_empty());

    let Some(base) = reported.next() else {
        return Err(FundamentalsError::EmptyResult {
            requested: series.len(),
        });
    };

    let table = reported.fold(FinancialTable::from_series(base), FinancialTable::outer_join);

    debug!(
        rows = table.height(),
        columns = table.width(),
        skipped = series.len() - table.width(),
        "Merged account series"
    );
    Ok(table)
}
