//! FILENAME: app/src/error.rs

use engine::{MatrixShapeError, TimeIndexError};
use persistence::PersistenceError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("malformed matrix: {0}")]
    Shape(#[from] MatrixShapeError),

    #[error("time index: {0}")]
    TimeIndex(#[from] TimeIndexError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("view is read-only")]
    ReadOnly,
}
