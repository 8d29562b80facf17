//! Pipeline and rendering configuration.
//!
//! Everything the pipeline needs is passed in through [`PipelineConfig`]; nothing
//! is read from process-wide state. The [`Default`] configuration reproduces the
//! reference run: operating cash flow, cash, liabilities, current assets,
//! revenues and long-term debt, renamed to canonical fields, with a 20x
//! valuation multiple.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::{FundamentalsError, Result};

/// Canonical column names.
pub mod columns {
    /// Row key column in exported frames.
    pub const YEAR: &str = "year";
    /// Operating cash flow.
    pub const CASH_FLOWS: &str = "CashFlows";
    /// Cash and cash equivalents.
    pub const CASH: &str = "Cash";
    /// Long-term debt.
    pub const LONG_TERM_DEBT: &str = "LongTermDebt";
    /// Current assets.
    pub const ASSETS_CURRENT: &str = "AssetsCurrent";
    /// Total liabilities.
    pub const LIABILITIES: &str = "Liabilities";
    /// Revenues.
    pub const REVENUES: &str = "Revenues";
    /// Total assets.
    pub const ASSETS: &str = "Assets";
    /// Stockholders' equity.
    pub const STOCKHOLDERS_EQUITY: &str = "StockholdersEquity";
    /// Earnings-multiple valuation.
    pub const VALUATION: &str = "valuation";
    /// Current assets over liabilities.
    pub const ASSETS_CURRENT_TO_LIABILITIES: &str = "ac/l";
    /// Operating cash flow over liabilities.
    pub const CASH_FLOWS_TO_LIABILITIES: &str = "cf/l";
}

/// Default valuation multiple applied to operating cash flow.
pub const DEFAULT_VALUATION_MULTIPLIER: f64 = 20.0;

/// Default number of decimals ratios are rounded to.
pub const DEFAULT_RATIO_DECIMALS: u32 = 2;

/// Equity element reported by filers with noncontrolling interests.
pub const EQUITY_WITH_NONCONTROLLING_INTEREST: &str =
    "StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest";

/// Rename map applied before metrics and drop list applied after them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalColumnSet {
    /// Raw element name → canonical field name.
    pub rename: BTreeMap<String, String>,
    /// Intermediate columns removed once metrics have consumed them.
    pub drop: Vec<String>,
}

impl CanonicalColumnSet {
    /// Adds a rename.
    #[must_use]
    pub fn with_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rename.insert(from.into(), to.into());
        self
    }

    /// Adds a column to the drop list.
    #[must_use]
    pub fn with_drop(mut self, column: impl Into<String>) -> Self {
        self.drop.push(column.into());
        self
    }
}

/// One `coefficient × column` term of a linear formula.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Term {
    /// Column the term reads.
    pub column: String,
    /// Multiplier applied to the column value.
    pub coefficient: f64,
}

impl Term {
    /// Creates a term.
    #[must_use]
    pub fn new(column: impl Into<String>, coefficient: f64) -> Self {
        Self {
            column: column.into(),
            coefficient,
        }
    }
}

/// Formula of a derived metric, evaluated per row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Formula {
    /// Sum of weighted columns. Null if any operand is null.
    Linear {
        /// Terms of the sum.
        terms: Vec<Term>,
    },
    /// `numerator / denominator`, optionally rounded. Null if either operand is
    /// null or the denominator is zero.
    Ratio {
        /// Numerator column.
        numerator: String,
        /// Denominator column.
        denominator: String,
        /// Decimals to round to.
        #[serde(default)]
        decimals: Option<u32>,
    },
}

impl Formula {
    /// Columns this formula reads.
    #[must_use]
    pub fn inputs(&self) -> Vec<&str> {
        match self {
            Self::Linear { terms } => terms.iter().map(|t| t.column.as_str()).collect(),
            Self::Ratio {
                numerator,
                denominator,
                ..
            } => vec![numerator.as_str(), denominator.as_str()],
        }
    }
}

/// A named formula over canonical columns yielding a new column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetric {
    /// Output column name.
    pub name: String,
    /// Formula evaluated per row.
    pub formula: Formula,
}

impl DerivedMetric {
    /// `multiplier × CashFlows + Cash − LongTermDebt`.
    #[must_use]
    pub fn valuation(multiplier: f64) -> Self {
        Self {
            name: columns::VALUATION.to_string(),
            formula: Formula::Linear {
                terms: vec![
                    Term::new(columns::CASH_FLOWS, multiplier),
                    Term::new(columns::CASH, 1.0),
                    Term::new(columns::LONG_TERM_DEBT, -1.0),
                ],
            },
        }
    }

    /// `Liabilities = Assets − StockholdersEquity`, for filers that report no
    /// total liabilities.
    #[must_use]
    pub fn liabilities_from_equity() -> Self {
        Self {
            name: columns::LIABILITIES.to_string(),
            formula: Formula::Linear {
                terms: vec![
                    Term::new(columns::ASSETS, 1.0),
                    Term::new(columns::STOCKHOLDERS_EQUITY, -1.0),
                ],
            },
        }
    }

    /// A rounded ratio of two columns.
    #[must_use]
    pub fn ratio(
        name: impl Into<String>,
        numerator: impl Into<String>,
        denominator: impl Into<String>,
        decimals: u32,
    ) -> Self {
        Self {
            name: name.into(),
            formula: Formula::Ratio {
                numerator: numerator.into(),
                denominator: denominator.into(),
                decimals: Some(decimals),
            },
        }
    }

    /// The standard set: `valuation`, `ac/l`, `cf/l`.
    #[must_use]
    pub fn standard(multiplier: f64, decimals: u32) -> Vec<Self> {
        vec![
            Self::valuation(multiplier),
            Self::ratio(
                columns::ASSETS_CURRENT_TO_LIABILITIES,
                columns::ASSETS_CURRENT,
                columns::LIABILITIES,
                decimals,
            ),
            Self::ratio(
                columns::CASH_FLOWS_TO_LIABILITIES,
                columns::CASH_FLOWS,
                columns::LIABILITIES,
                decimals,
            ),
        ]
    }
}

/// A magnitude threshold and the suffix used at or above it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    /// Lower bound on the absolute value.
    pub value: f64,
    /// Suffix appended to the scaled value.
    pub suffix: String,
}

impl Threshold {
    /// Creates a threshold.
    #[must_use]
    pub fn new(value: f64, suffix: impl Into<String>) -> Self {
        Self {
            value,
            suffix: suffix.into(),
        }
    }
}

/// Display settings for the formatter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Magnitude thresholds; evaluated largest first regardless of order here.
    pub thresholds: Vec<Threshold>,
    /// Decimals printed for scaled values.
    pub decimals: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![
                Threshold::new(1e12, "T"),
                Threshold::new(1e9, "B"),
                Threshold::new(1e6, "M"),
            ],
            decimals: 2,
        }
    }
}

impl RenderConfig {
    /// Checks thresholds are positive and finite.
    pub fn validate(&self) -> Result<()> {
        for threshold in &self.thresholds {
            if !threshold.value.is_finite() || threshold.value <= 0.0 {
                return Err(FundamentalsError::InvalidParameter(format!(
                    "Threshold for suffix {:?} must be positive, got {}",
                    threshold.suffix, threshold.value
                )));
            }
        }
        Ok(())
    }
}

/// Full pipeline configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Taxonomies to try for each account, in order.
    pub taxonomies: Vec<String>,
    /// Accounts (raw element names) to extract, in column order.
    pub accounts: Vec<String>,
    /// Alternate element names tried when an account yields nothing.
    pub aliases: BTreeMap<String, Vec<String>>,
    /// Rename map and drop list.
    pub columns: CanonicalColumnSet,
    /// Earnings multiple used by the valuation metric.
    pub valuation_multiplier: f64,
    /// Decimals the standard ratios are rounded to.
    pub ratio_decimals: u32,
    /// Fills for null cells, applied after renames and before metrics. Each
    /// entry's name is the column it fills. Inputs missing from the table are
    /// read from the document.
    pub fallbacks: Vec<DerivedMetric>,
    /// Metrics evaluated after the standard set.
    pub extra_metrics: Vec<DerivedMetric>,
    /// Formatter settings.
    pub render: RenderConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            taxonomies: vec!["us-gaap".to_string(), "ifrs-full".to_string()],
            accounts: [
                "NetCashProvidedByUsedInOperatingActivities",
                "CashAndCashEquivalentsAtCarryingValue",
                columns::LIABILITIES,
                columns::ASSETS_CURRENT,
                columns::REVENUES,
                columns::LONG_TERM_DEBT,
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            aliases: BTreeMap::from([(
                columns::STOCKHOLDERS_EQUITY.to_string(),
                vec![EQUITY_WITH_NONCONTROLLING_INTEREST.to_string()],
            )]),
            columns: CanonicalColumnSet::default()
                .with_rename(
                    "NetCashProvidedByUsedInOperatingActivities",
                    columns::CASH_FLOWS,
                )
                .with_rename("CashAndCashEquivalentsAtCarryingValue", columns::CASH)
                .with_drop(columns::REVENUES)
                .with_drop(columns::ASSETS_CURRENT)
                .with_drop(columns::LIABILITIES),
            valuation_multiplier: DEFAULT_VALUATION_MULTIPLIER,
            ratio_decimals: DEFAULT_RATIO_DECIMALS,
            fallbacks: vec![DerivedMetric::liabilities_from_equity()],
            extra_metrics: Vec::new(),
            render: RenderConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Loads a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| FundamentalsError::Parse(format!("Invalid pipeline config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces the requested accounts.
    #[must_use]
    pub fn with_accounts<I, S>(mut self, accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accounts = accounts.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the taxonomy fallback order.
    #[must_use]
    pub fn with_taxonomies<I, S>(mut self, taxonomies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.taxonomies = taxonomies.into_iter().map(Into::into).collect();
        self
    }

    /// Adds alternate element names for an account.
    #[must_use]
    pub fn with_alias<I, S>(mut self, account: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases
            .insert(account.into(), aliases.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces the rename map and drop list.
    #[must_use]
    pub fn with_columns(mut self, columns: CanonicalColumnSet) -> Self {
        self.columns = columns;
        self
    }

    /// Sets the valuation multiple.
    #[must_use]
    pub const fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.valuation_multiplier = multiplier;
        self
    }

    /// Appends a fill for the null cells of `fallback.name`.
    #[must_use]
    pub fn with_fallback(mut self, fallback: DerivedMetric) -> Self {
        self.fallbacks.push(fallback);
        self
    }

    /// Removes every fill.
    #[must_use]
    pub fn without_fallbacks(mut self) -> Self {
        self.fallbacks.clear();
        self
    }

    /// Appends a metric evaluated after the standard set.
    #[must_use]
    pub fn with_metric(mut self, metric: DerivedMetric) -> Self {
        self.extra_metrics.push(metric);
        self
    }

    /// Sets the formatter settings.
    #[must_use]
    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    /// Standard metrics followed by the extra metrics.
    #[must_use]
    pub fn metrics(&self) -> Vec<DerivedMetric> {
        let mut metrics = DerivedMetric::standard(self.valuation_multiplier, self.ratio_decimals);
        metrics.extend(self.extra_metrics.iter().cloned());
        metrics
    }

    /// Rejects configurations the pipeline cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.taxonomies.is_empty() {
            return Err(FundamentalsError::InvalidParameter(
                "At least one taxonomy is required".to_string(),
            ));
        }
        if self.accounts.is_empty() {
            return Err(FundamentalsError::InvalidParameter(
                "At least one account is required".to_string(),
            ));
        }
        if !self.valuation_multiplier.is_finite() {
            return Err(FundamentalsError::InvalidParameter(format!(
                "Valuation multiplier must be finite, got {}",
                self.valuation_multiplier
            )));
        }
        if let Some(metric) = self
            .extra_metrics
            .iter()
            .chain(&self.fallbacks)
            .find(|m| m.name.is_empty())
        {
            return Err(FundamentalsError::InvalidParameter(format!(
                "Metric name must not be empty: {:?}",
                metric.formula
            )));
        }

        // Extra metrics must not overwrite inputs or each other.
        let standard = DerivedMetric::standard(self.valuation_multiplier, self.ratio_decimals);
        let mut taken: HashSet<&str> = standard.iter().map(|m| m.name.as_str()).collect();
        taken.insert(columns::YEAR);
        taken.extend(self.accounts.iter().map(String::as_str));
        taken.extend(self.columns.rename.values().map(String::as_str));
        for metric in &self.extra_metrics {
            if !taken.insert(metric.name.as_str()) {
                return Err(FundamentalsError::InvalidParameter(format!(
                    "Metric name {:?} clashes with an existing column or metric",
                    metric.name
                )));
            }
        }

        self.render.validate()
    }
}
