//! Column renames and intermediate-column drops.

use fundamentals_core::CanonicalColumnSet;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::table::FinancialTable;

/// Applies a [`CanonicalColumnSet`] to a table.
///
/// `rename` runs before metrics so formulas can refer to canonical names;
/// `drop_intermediate` runs after, once the metrics have consumed the raw
/// inputs. Both skip columns the table does not have.
#[derive(Clone, Debug, Default)]
pub struct SchemaNormalizer {
    columns: CanonicalColumnSet,
}

impl SchemaNormalizer {
    /// Creates a normalizer for a column set.
    #[must_use]
    pub const fn new(columns: CanonicalColumnSet) -> Self {
        Self { columns }
    }

    /// The configured column set.
    #[must_use]
    pub const fn columns(&self) -> &CanonicalColumnSet {
        &self.columns
    }

    /// Renames raw element columns to canonical names.
    ///
    /// A rename whose source column is absent is skipped. A rename whose target
    /// already exists in the table, or is the target of an earlier rename, is
    /// skipped with a warning so the table never holds duplicate names.
    #[must_use]
    pub fn rename(&self, mut table: FinancialTable) -> FinancialTable {
        let mut targets = HashSet::new();
        let mut plan = Vec::new();

        for (from, to) in &self.columns.rename {
            if !table.has_column(from) {
                debug!(column = %from, "Rename source absent, skipping");
                continue;
            }
            if from == to {
                continue;
            }
            if table.has_column(to) || !targets.insert(to.as_str()) {
                warn!(from = %from, to = %to, "Rename target already present, skipping");
                continue;
            }
            plan.push((from.as_str(), to.as_str()));
        }

        for (from, to) in plan {
            table.rename_column(from, to);
        }
        table
    }

    /// Removes intermediate columns. Absent columns are skipped.
    #[must_use]
    pub fn drop_intermediate(&self, mut table: FinancialTable) -> FinancialTable {
        for column in &self.columns.drop {
            if !table.drop_column(column) {
                debug!(column = %column, "Drop target absent, skipping");
            }
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundamentals_core::AccountSeries;

    fn table(names: &[&str]) -> FinancialTable {
        names.iter().fold(FinancialTable::default(), |t, name| {
            t.outer_join(&AccountSeries::from_pairs(*name, [(2022, 1.0)]))
        })
    }

    #[test]
    fn test_rename_skips_absent_sources() {
        let normalizer = SchemaNormalizer::new(
            CanonicalColumnSet::default()
                .with_rename("NetCashProvidedByUsedInOperatingActivities", "CashFlows")
                .with_rename("CashAndCashEquivalentsAtCarryingValue", "Cash"),
        );
        let renamed = normalizer.rename(table(&[
            "CashAndCashEquivalentsAtCarryingValue",
            "Liabilities",
        ]));

        assert_eq!(renamed.column_names(), vec!["Cash", "Liabilities"]);
    }

    #[test]
    fn test_rename_refuses_collisions() {
        let normalizer = SchemaNormalizer::new(
            CanonicalColumnSet::default()
                .with_rename("A", "Cash")
                .with_rename("B", "Cash"),
        );
        let renamed = normalizer.rename(table(&["A", "B"]));
        assert_eq!(renamed.column_names(), vec!["Cash", "B"]);

        let renamed = normalizer.rename(table(&["A", "Cash"]));
        assert_eq!(renamed.column_names(), vec!["A", "Cash"]);
    }

    #[test]
    fn test_drop_skips_absent_columns() {
        let normalizer = SchemaNormalizer::new(
            CanonicalColumnSet::default()
                .with_drop("Revenues")
                .with_drop("AssetsCurrent")
                .with_drop("Liabilities"),
        );
        let dropped = normalizer.drop_intermediate(table(&["Cash", "Liabilities", "ac/l"]));
        assert_eq!(dropped.column_names(), vec!["Cash", "ac/l"]);
        assert_eq!(dropped.years(), &[2022]);
    }
}
