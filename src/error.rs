use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatementTreeError {
    #[error("Invalid period {year:?}/{month:?}: month must be between 1 and 12")]
    InvalidPeriod {
        year: Option<String>,
        month: Option<String>,
    },

    #[error("Unexpected statement payload: {0}")]
    UnexpectedPayload(String),

    #[error("Summarizer failed: {0}")]
    Summarizer(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StatementTreeError>;
