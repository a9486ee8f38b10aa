use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{path}: missing required column {column:?}")]
    MissingColumn { path: PathBuf, column: String },
    #[error("artifact {key:?}: {message}")]
    Artifact { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, IngestError>;
