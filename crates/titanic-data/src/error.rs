use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("Titanic CSV not found at: {}\nDownload the Kaggle Titanic train.csv and save it at this path.", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset is missing required column: {0}")]
    MissingColumn(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Column {0} is not numeric")]
    NotNumeric(String),

    #[error("Column {0} has no values")]
    Empty(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

pub type Result<T> = std::result::Result<T, DataError>;
