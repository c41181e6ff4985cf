use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImpactError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine failed for dataset '{dataset}': {message}")]
    Engine { dataset: String, message: String },

    #[error("Column '{column}' missing from {entity} frame")]
    MissingColumn { entity: String, column: String },

    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    ColumnLength {
        column:   String,
        expected: usize,
        actual:   usize,
    },

    #[error("Unknown state code '{state}'")]
    UnknownState { state: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ImpactResult<T> = Result<T, ImpactError>;
