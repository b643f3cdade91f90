use thiserror::Error;

/// Contract errors raised by the ratio and ranking engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("unknown metric '{value}', expected one of ND/EBITDA, ROE, ROA")]
    UnknownMetric { value: String },
}

/// Errors raised while bulk loading delimited files.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file not found: {path}")]
    FileNotFound { path: String },
    #[error("{path}: missing column '{column}' in header")]
    MissingColumn { path: String, column: String },
    #[error("unsupported delimiter '{value}', expected comma or tab")]
    UnsupportedDelimiter { value: String },
    #[error("{path}: row {row}: {source}")]
    Row {
        path: String,
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
