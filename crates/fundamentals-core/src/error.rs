//! Error types for fundamentals operations.
//!
//! This module defines [`FundamentalsError`] which covers both the data gaps the
//! pipeline absorbs (missing accounts, unsupported currencies, undefined ratios)
//! and the failures it surfaces to callers (malformed documents, empty results,
//! fetch errors).

use thiserror::Error;

/// Errors that can occur while fetching facts or building a financial table.
#[derive(Error, Debug)]
pub enum FundamentalsError {
    /// The requested account is absent from the document, or nothing is left
    /// after unit and period filtering.
    #[error("Account not reported: {account}")]
    MissingAccount {
        /// The requested account (element) name.
        account: String,
    },

    /// The account only reports in units other than USD.
    #[error("Account {account} has no USD unit bucket (found: {})", units.join(", "))]
    UnsupportedCurrency {
        /// The requested account (element) name.
        account: String,
        /// The unit buckets that were present.
        units: Vec<String>,
    },

    /// The document lacks the expected top-level structure.
    #[error("Malformed facts document: {0}")]
    MalformedDocument(String),

    /// Every requested account came back empty.
    #[error("No data for any of the {requested} requested accounts")]
    EmptyResult {
        /// Number of accounts that were requested.
        requested: usize,
    },

    /// A ratio's denominator is zero or null.
    #[error("Division undefined: {numerator} / {denominator}")]
    DivisionUndefined {
        /// The numerator column.
        numerator: String,
        /// The denominator column.
        denominator: String,
    },

    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// The requested symbol was not found.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// No facts document exists for the requested company.
    #[error("Facts document not found for CIK {0}")]
    DocumentNotFound(String),

    /// Error parsing auxiliary data (ticker lists, configuration).
    #[error("Parse error: {0}")]
    Parse(String),

    /// The requested source is not configured.
    #[error("Source not configured: {0}")]
    ProviderNotConfigured(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl FundamentalsError {
    /// Returns true for per-account or per-cell gaps that the pipeline absorbs
    /// instead of failing the run.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MissingAccount { .. }
                | Self::UnsupportedCurrency { .. }
                | Self::DivisionUndefined { .. }
        )
    }
}

/// Result type alias using [`FundamentalsError`].
pub type Result<T> = std::result::Result<T, FundamentalsError>;
