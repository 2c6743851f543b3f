//! FILENAME: core/persistence/src/lib.rs
//! Matrix Persistence Module
//!
//! Loads matrices and time-index descriptors from the remote study store,
//! sends batched cell edits back, and uploads replacement files.

mod error;
mod http;
mod import;
mod memory;

pub use error::PersistenceError;
pub use http::HttpMatrixStore;
pub use import::{parse_delimited, ImportFile};
pub use memory::{InMemoryStore, StoreCall};

use engine::{Matrix, MatrixShapeError, PendingUpdate, TimeMetadata};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// MATRIX PAYLOAD
// ============================================================================

/// Matrix content as exchanged with the remote store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixData {
    pub data: Vec<Vec<f64>>,
    #[serde(default)]
    pub columns: Vec<i64>,
    #[serde(default)]
    pub index: Vec<i64>,
}

impl MatrixData {
    /// Wraps rows, numbering columns and index from 0.
    pub fn from_rows(data: Vec<Vec<f64>>) -> Self {
        let cols = data.first().map(Vec::len).unwrap_or(0);
        let rows = data.len();
        MatrixData {
            data,
            columns: (0..cols as i64).collect(),
            index: (0..rows as i64).collect(),
        }
    }

    pub fn to_matrix(&self) -> Result<Matrix, MatrixShapeError> {
        Matrix::from_rows(self.data.clone())
    }

    pub fn from_matrix(matrix: &Matrix) -> Self {
        MatrixData::from_rows(matrix.iter_rows().map(<[f64]>::to_vec).collect())
    }
}

// ============================================================================
// STORE CONTRACT
// ============================================================================

/// Remote collaborator of a matrix grid view.
///
/// Calls are awaited by a single view at a time; implementations are free to
/// hold interior state behind locks.
#[allow(async_fn_in_trait)]
pub trait MatrixStore {
    async fn fetch_matrix(
        &self,
        study_id: &str,
        path: &str,
    ) -> Result<MatrixData, PersistenceError>;

    async fn fetch_time_index(
        &self,
        study_id: &str,
        path: &str,
    ) -> Result<TimeMetadata, PersistenceError>;

    /// Sends a batch of edits. The remote applies the batch all-or-nothing.
    async fn flush_edits(
        &self,
        study_id: &str,
        path: &str,
        updates: &[PendingUpdate],
    ) -> Result<(), PersistenceError>;

    /// Replaces the matrix at `path` with the content of `file`.
    async fn import_file(
        &self,
        file: &ImportFile,
        study_id: &str,
        path: &str,
    ) -> Result<(), PersistenceError>;
}

impl<S: MatrixStore> MatrixStore for Arc<S> {
    async fn fetch_matrix(
        &self,
        study_id: &str,
        path: &str,
    ) -> Result<MatrixData, PersistenceError> {
        (**self).fetch_matrix(study_id, path).await
    }

    async fn fetch_time_index(
        &self,
        study_id: &str,
        path: &str,
    ) -> Result<TimeMetadata, PersistenceError> {
        (**self).fetch_time_index(study_id, path).await
    }

    async fn flush_edits(
        &self,
        study_id: &str,
        path: &str,
        updates: &[PendingUpdate],
    ) -> Result<(), PersistenceError> {
        (**self).flush_edits(study_id, path, updates).await
    }

    async fn import_file(
        &self,
        file: &ImportFile,
        study_id: &str,
        path: &str,
    ) -> Result<(), PersistenceError> {
        (**self).import_file(file, study_id, path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_data_from_remote_json() {
        let json = r#"{"data":[[1.0,2.0],[3.0,4.0]],"columns":[0,1],"index":[0,1]}"#;
        let payload: MatrixData = serde_json::from_str(json).unwrap();
        let matrix = payload.to_matrix().unwrap();
        assert_eq!(matrix.rows(), 2);
        assert_eq!(matrix.get(1, 0), Some(3.0));
    }

    #[test]
    fn test_matrix_data_defaults_labels() {
        let payload: MatrixData = serde_json::from_str(r#"{"data":[[1.0]]}"#).unwrap();
        assert!(payload.columns.is_empty());

        let numbered = MatrixData::from_rows(vec![vec![1.0, 2.0, 3.0]]);
        assert_eq!(numbered.columns, vec![0, 1, 2]);
        assert_eq!(numbered.index, vec![0]);
    }

    #[test]
    fn test_ragged_payload_rejected() {
        let payload = MatrixData::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(payload.to_matrix().is_err());
    }
}
