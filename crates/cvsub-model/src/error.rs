use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid extraction date {0:?}: expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("malformed row: {0}")]
    MalformedRow(String),
    #[error("report document: {0}")]
    Report(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
