//! The extract → merge → rename → fill → derive → drop pipeline.

use fundamentals_core::{FundamentalsError, PipelineConfig, RawFactsDocument, Result};
use tracing::{debug, instrument};

use crate::{
    extract::AccountExtractor,
    fill::ColumnFiller,
    format::{DisplayTable, Formatter},
    merge::merge_series,
    metrics::MetricsCalculator,
    normalize::SchemaNormalizer,
    table::FinancialTable,
};

/// Result of a pipeline run.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Entity name from the document, if present.
    pub entity_name: Option<String>,
    /// The financial table.
    pub table: FinancialTable,
    /// Recoverable gaps: requested accounts that contributed no column.
    pub gaps: Vec<FundamentalsError>,
}

impl PipelineOutput {
    /// Returns true if every requested account contributed a column.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.gaps.is_empty()
    }
}

/// One configured pipeline, reusable across documents.
///
/// A run is a pure function of the document and the configuration, so a single
/// `Pipeline` can serve any number of concurrent runs.
#[derive(Clone, Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    extractor: AccountExtractor,
    normalizer: SchemaNormalizer,
    filler: ColumnFiller,
    calculator: MetricsCalculator,
    formatter: Formatter,
}

impl Pipeline {
    /// Builds a pipeline after validating the configuration.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            extractor: AccountExtractor::from_config(&config),
            normalizer: SchemaNormalizer::new(config.columns.clone()),
            filler: ColumnFiller::from_config(&config),
            calculator: MetricsCalculator::from_config(&config),
            formatter: Formatter::new(&config.render),
            config,
        })
    }

    /// The configuration this pipeline runs with.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every stage up to and including metric computation, keeping the
    /// intermediate columns.
    ///
    /// Fails with `EmptyResult` if no requested account has annual USD data.
    #[instrument(skip_all, fields(entity = doc.entity_name.as_deref().unwrap_or("unknown")))]
    pub fn derive(&self, doc: &RawFactsDocument) -> Result<PipelineOutput> {
        let extraction = self.extractor.extract_all(doc, &self.config.accounts)?;
        let table = merge_series(&extraction.series)?;
        let table = self.normalizer.rename(table);
        let table = self.filler.apply(doc, &self.extractor, table)?;
        let table = self.calculator.apply(table);

        debug!(
            rows = table.height(),
            columns = table.width(),
            gaps = extraction.gaps.len(),
            "Derived financial table"
        );

        Ok(PipelineOutput {
            entity_name: doc.entity_name.clone(),
            table,
            gaps: extraction.gaps,
        })
    }

    /// Runs the full pipeline: [`derive`](Self::derive) followed by dropping
    /// the intermediate columns.
    pub fn run(&self, doc: &RawFactsDocument) -> Result<PipelineOutput> {
        let mut output = self.derive(doc)?;
        output.table = self.normalizer.drop_intermediate(output.table);
        Ok(output)
    }

    /// Renders a table with the configured formatter.
    #[must_use]
    pub fn render(&self, table: &FinancialTable) -> DisplayTable {
        self.formatter.render(table)
    }
}
