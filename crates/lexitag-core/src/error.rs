use thiserror::Error;

#[derive(Debug, Error)]
pub enum LexitagError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A rejected caller operation. Never leaves the store or earlier results
/// partially updated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required text column '{0}' is missing")]
    MissingColumn(String),

    #[error("dictionary name '{0}' is empty after normalization")]
    InvalidName(String),

    #[error("output column '{0}' already exists in the dataset")]
    ColumnConflict(String),

    #[error("no dictionary named '{0}'")]
    UnknownDictionary(String),
}
