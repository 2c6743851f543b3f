//! FILENAME: core/persistence/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Edits rejected: {0}")]
    Validation(String),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Invalid delimited file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed matrix: {0}")]
    Shape(#[from] engine::MatrixShapeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
