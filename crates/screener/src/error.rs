//! Error types for screener operations.

use thiserror::Error;

/// Result type for screener operations.
pub type Result<T> = std::result::Result<T, ScreenError>;

/// Errors that can occur while loading data or evaluating a scan.
///
/// Only pipeline-fatal conditions live here. Field-level problems (an
/// unresolved column, an unparsable cell, a benchmark timeframe without a
/// return) degrade to missing values and never surface as errors.
#[derive(Debug, Error)]
pub enum ScreenError {
    /// A required dataset was present but contained no rows
    #[error("Dataset '{0}' is empty")]
    EmptyDataset(String),

    /// The universe dataset has no resolvable ticker identity column
    #[error("Dataset '{0}' has no ticker column (expected 'Symbol' or similar)")]
    MissingTickerColumn(String),

    /// The benchmark ticker was not found in the benchmark dataset
    #[error("Benchmark row not found: no '{0}' in the benchmark dataset")]
    BenchmarkNotFound(String),

    /// RS threshold outside the valid score range
    #[error("Invalid RS threshold {0}: must be between 1 and 99")]
    InvalidThreshold(u8),

    /// Polars DataFrame error
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}
