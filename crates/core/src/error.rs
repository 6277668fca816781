//! Error types for regstat extraction.

use regstat_sheet::SheetError;
use thiserror::Error;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that can occur while extracting regional figures.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Workbook could not be opened or the sheet could not be resolved.
    #[error(transparent)]
    Sheet(#[from] SheetError),

    /// A classification filter that can never be applied.
    #[error("Invalid classification filter: {0}")]
    InvalidFilter(String),

    /// Neither the header nor the offset fallback yields columns.
    #[error("No columns for period {period} in sheet '{sheet}' (header row {header_row})")]
    PeriodNotFound {
        sheet: String,
        header_row: usize,
        period: String,
    },

    /// Column plan was guessed and the caller asked for exact columns only.
    #[error("Columns for period {period} in sheet '{sheet}' are approximate (current col {current}, comparison col {comparison})")]
    ApproximateColumns {
        sheet: String,
        period: String,
        current: usize,
        comparison: usize,
    },

    #[error("Unknown indicator: {0}")]
    UnknownIndicator(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML configuration could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the error means the sheet itself could not be found.
    #[must_use]
    pub fn is_sheet_not_found(&self) -> bool {
        matches!(self, ExtractError::Sheet(SheetError::SheetNotFound { .. }))
    }
}
