use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinsenseError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown emotion: {0}")]
    UnknownEmotion(String),

    #[error("Unknown income source: {0}")]
    UnknownSource(String),

    #[error("Unknown recurring interval: {0}")]
    UnknownInterval(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Bill not found: {0}")]
    BillNotFound(u64),

    #[error("Entry not found: {0}")]
    EntryNotFound(u64),

    #[error("Not initialized: {0}")]
    NotInitialized(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FinsenseError>;
