use thiserror::Error;

/// Faults raised while answering a single targeting request.
///
/// Startup problems (missing or corrupt artifacts) are reported through
/// `anyhow` before any request is accepted; everything here is recoverable at
/// the request boundary.
#[derive(Debug, Error)]
pub enum TargetingError {
    #[error("hour {0} is outside 0-23")]
    HourOutOfRange(u32),
    #[error("unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },
    #[error("dataset has no column '{0}'")]
    MissingColumn(String),
    #[error("no encoder for categorical column '{0}'")]
    MissingEncoder(String),
    #[error("row {row}: column '{column}' has non-numeric value '{value}'")]
    NonNumericFeature {
        row: usize,
        column: String,
        value: String,
    },
    #[error("classifier returned {got} labels for {expected} rows")]
    LabelCount { expected: usize, got: usize },
    #[error("feature row has {got} values, classifier expects {expected}")]
    FeatureWidth { expected: usize, got: usize },
    #[error("CSV export failed: {0}")]
    Export(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, TargetingError>;
