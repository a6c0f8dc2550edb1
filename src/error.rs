use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayoffError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Malformed date: {0} (expected YYYY-MM-DD)")]
    MalformedDate(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown case: {0}")]
    UnknownCase(i64),

    #[error("Unknown transaction: {0}")]
    UnknownTransaction(i64),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, PayoffError>;
