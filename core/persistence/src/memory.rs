//! FILENAME: core/persistence/src/memory.rs
//! PURPOSE: In-process `MatrixStore` for offline use and tests.
//! CONTEXT: Mirrors the remote semantics: edit batches are validated as a
//! whole and applied all-or-nothing; imports replace the matrix (creating it
//! when missing). Call counters and one-shot failures make view behavior
//! observable.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use engine::{DataCoord, PendingUpdate, TimeMetadata};

use crate::{parse_delimited, ImportFile, MatrixData, MatrixStore, PersistenceError};

/// Operations of the store contract, used for counters and injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreCall {
    FetchMatrix,
    FetchTimeIndex,
    FlushEdits,
    ImportFile,
}

type Key = (String, String);

#[derive(Debug, Default)]
pub struct InMemoryStore {
    matrices: Mutex<HashMap<Key, MatrixData>>,
    indexes: Mutex<HashMap<Key, TimeMetadata>>,
    calls: Mutex<HashMap<StoreCall, usize>>,
    failures: Mutex<HashMap<StoreCall, String>>,
    flushed: Mutex<Vec<Vec<PendingUpdate>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn key(study_id: &str, path: &str) -> Key {
    (study_id.to_string(), path.to_string())
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore::default()
    }

    pub fn insert_matrix(&self, study_id: &str, path: &str, data: MatrixData) {
        lock(&self.matrices).insert(key(study_id, path), data);
    }

    pub fn insert_time_index(&self, study_id: &str, path: &str, metadata: TimeMetadata) {
        lock(&self.indexes).insert(key(study_id, path), metadata);
    }

    pub fn matrix(&self, study_id: &str, path: &str) -> Option<MatrixData> {
        lock(&self.matrices).get(&key(study_id, path)).cloned()
    }

    /// Makes the next call of `call` fail with a server error carrying `message`.
    pub fn fail_next(&self, call: StoreCall, message: impl Into<String>) {
        lock(&self.failures).insert(call, message.into());
    }

    pub fn call_count(&self, call: StoreCall) -> usize {
        lock(&self.calls).get(&call).copied().unwrap_or(0)
    }

    /// Every batch accepted by `flush_edits`, oldest first.
    pub fn flushed_batches(&self) -> Vec<Vec<PendingUpdate>> {
        lock(&self.flushed).clone()
    }

    fn enter(&self, call: StoreCall) -> Result<(), PersistenceError> {
        *lock(&self.calls).entry(call).or_insert(0) += 1;
        match lock(&self.failures).remove(&call) {
            Some(message) => Err(PersistenceError::Status {
                status: 500,
                message,
            }),
            None => Ok(()),
        }
    }
}

impl MatrixStore for InMemoryStore {
    async fn fetch_matrix(
        &self,
        study_id: &str,
        path: &str,
    ) -> Result<MatrixData, PersistenceError> {
        self.enter(StoreCall::FetchMatrix)?;
        self.matrix(study_id, path)
            .ok_or_else(|| PersistenceError::NotFound(format!("{}/{}", study_id, path)))
    }

    async fn fetch_time_index(
        &self,
        study_id: &str,
        path: &str,
    ) -> Result<TimeMetadata, PersistenceError> {
        self.enter(StoreCall::FetchTimeIndex)?;
        lock(&self.indexes)
            .get(&key(study_id, path))
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound(format!("{}/{} index", study_id, path)))
    }

    async fn flush_edits(
        &self,
        study_id: &str,
        path: &str,
        updates: &[PendingUpdate],
    ) -> Result<(), PersistenceError> {
        self.enter(StoreCall::FlushEdits)?;
        let mut matrices = lock(&self.matrices);
        let data = matrices
            .get_mut(&key(study_id, path))
            .ok_or_else(|| PersistenceError::NotFound(format!("{}/{}", study_id, path)))?;
        let mut matrix = data.to_matrix()?;

        // Validate the whole batch before touching anything
        if let Some(bad) = updates
            .iter()
            .find(|u| !matrix.contains(u.coordinates.row, u.coordinates.col))
        {
            return Err(PersistenceError::Validation(format!(
                "coordinate [{}, {}] outside {}x{} matrix",
                bad.coordinates.col,
                bad.coordinates.row,
                matrix.rows(),
                matrix.cols()
            )));
        }

        for update in updates {
            let DataCoord { col, row } = update.coordinates;
            if let Some(current) = matrix.get(row, col) {
                matrix.set(row, col, update.operation.apply(current));
            }
        }

        data.data = matrix.into_rows();
        lock(&self.flushed).push(updates.to_vec());
        Ok(())
    }

    async fn import_file(
        &self,
        file: &ImportFile,
        study_id: &str,
        path: &str,
    ) -> Result<(), PersistenceError> {
        self.enter(StoreCall::ImportFile)?;
        let data = parse_delimited(&file.bytes)?;
        log::debug!("imported {} rows into {}/{}", data.data.len(), study_id, path);
        self.insert_matrix(study_id, path, data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{Operation, Operator, TimeFrequency};

    fn store() -> InMemoryStore {
        let store = InMemoryStore::new();
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        store.insert_matrix("s1", "load", MatrixData::from_rows(rows));
        store
    }

    #[tokio::test]
    async fn test_fetch_missing_matrix() {
        let store = InMemoryStore::new();
        let result = store.fetch_matrix("s1", "nope").await;
        assert!(matches!(result, Err(PersistenceError::NotFound(_))));
        assert_eq!(store.call_count(StoreCall::FetchMatrix), 1);
    }

    #[tokio::test]
    async fn test_flush_applies_batch() {
        let store = store();
        let updates = vec![
            PendingUpdate::set(DataCoord::new(1, 0), 9.0),
            PendingUpdate {
                coordinates: DataCoord::new(0, 1),
                operation: Operation {
                    operation: Operator::Mul,
                    value: 2.0,
                },
            },
        ];
        store.flush_edits("s1", "load", &updates).await.unwrap();

        let data = store.matrix("s1", "load").unwrap();
        assert_eq!(data.data, vec![vec![1.0, 9.0], vec![6.0, 4.0]]);
        assert_eq!(store.flushed_batches(), vec![updates]);
    }

    #[tokio::test]
    async fn test_flush_is_all_or_nothing() {
        let store = store();
        let updates = vec![
            PendingUpdate::set(DataCoord::new(0, 0), 9.0),
            PendingUpdate::set(DataCoord::new(5, 0), 9.0),
        ];
        let result = store.flush_edits("s1", "load", &updates).await;
        assert!(matches!(result, Err(PersistenceError::Validation(_))));
        assert_eq!(store.matrix("s1", "load").unwrap().data[0][0], 1.0);
        assert!(store.flushed_batches().is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot() {
        let store = store();
        store.fail_next(StoreCall::FlushEdits, "boom");
        let updates = [PendingUpdate::set(DataCoord::new(0, 0), 9.0)];

        let first = store.flush_edits("s1", "load", &updates).await;
        assert!(matches!(first, Err(PersistenceError::Status { status: 500, .. })));
        store.flush_edits("s1", "load", &updates).await.unwrap();
        assert_eq!(store.call_count(StoreCall::FlushEdits), 2);
    }

    #[tokio::test]
    async fn test_import_replaces_matrix() {
        let store = store();
        let file = ImportFile::new("load.txt", "7\t8\t9\n");
        store.import_file(&file, "s1", "load").await.unwrap();
        assert_eq!(store.matrix("s1", "load").unwrap().data, vec![vec![7.0, 8.0, 9.0]]);
    }

    #[tokio::test]
    async fn test_time_index_lookup() {
        let store = store();
        let metadata = TimeMetadata::new("2018-01-01", 2, TimeFrequency::Daily);
        store.insert_time_index("s1", "load", metadata);
        let metadata = store.fetch_time_index("s1", "load").await.unwrap();
        assert_eq!(metadata.steps, 2);
    }
}
