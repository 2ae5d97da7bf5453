// src/error.rs
use thiserror::Error;

/// Failures of the retrieval-and-transform pipeline.
///
/// `EmptyColumn` and `UnusableBaseline` are absorbed by the normalizer and
/// never escape a render cycle; they exist so the absorbed column can be
/// reported.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DashboardError {
    #[error("data source error for {symbol}: {reason}")]
    DataSource { symbol: String, reason: String },

    #[error("column '{key}' has no data in the selected window")]
    EmptyColumn { key: String },

    #[error("column '{key}' cannot be rescaled from a baseline of {value}")]
    UnusableBaseline { key: String, value: f64 },

    #[error("select at least one instrument")]
    NoSelection,

    #[error("unknown instrument key '{0}' in label lookup")]
    UnknownInstrument(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl DashboardError {
    pub fn data_source(symbol: &str, reason: impl ToString) -> Self {
        DashboardError::DataSource {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
