//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for matrix view integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use app_lib::{MatrixView, ViewConfig};
use engine::{GridCoord, TimeFrequency, TimeMetadata};
use persistence::{InMemoryStore, MatrixData};

pub const STUDY: &str = "study-1";
pub const PATH: &str = "input/load/series/load_fr";

pub type TestView = MatrixView<Arc<InMemoryStore>>;

/// Test harness holding a view and the in-memory store behind it.
/// The store is shared so tests can inspect calls and inject failures.
pub struct TestHarness {
    pub store: Arc<InMemoryStore>,
    pub view: TestView,
}

impl TestHarness {
    /// Create a harness over `rows` without a time index.
    pub fn new(rows: Vec<Vec<f64>>, config: ViewConfig) -> Self {
        app_lib::logging::set_stderr(false);
        let store = Arc::new(InMemoryStore::new());
        store.insert_matrix(STUDY, PATH, MatrixData::from_rows(rows));
        let view = MatrixView::new(Arc::clone(&store), STUDY, PATH, config);
        TestHarness { store, view }
    }

    /// Create a harness with a 3x2 matrix and a daily index starting 2024-01-01.
    /// Grid layout: [date, TS 1, TS 2].
    pub fn with_sample_data() -> Self {
        Self::with_sample_config(ViewConfig::default())
    }

    pub fn with_sample_config(config: ViewConfig) -> Self {
        let harness = Self::new(sample_rows(), config);
        harness.store.insert_time_index(
            STUDY,
            PATH,
            TimeMetadata::new("2024-01-01", 3, TimeFrequency::Daily),
        );
        harness
    }

    /// Sample harness, already loaded.
    pub async fn loaded() -> Self {
        let mut harness = Self::with_sample_data();
        harness.view.load().await.expect("load sample matrix");
        harness
    }

    pub async fn loaded_with(config: ViewConfig) -> Self {
        let mut harness = Self::with_sample_config(config);
        harness.view.load().await.expect("load sample matrix");
        harness
    }

    /// Display text of a grid cell.
    pub fn display(&mut self, col: usize, row: usize) -> String {
        self.view.resolve_cell(GridCoord::new(col, row)).display()
    }

    /// Current remote matrix rows.
    pub fn remote_rows(&self) -> Vec<Vec<f64>> {
        self.store
            .matrix(STUDY, PATH)
            .map(|data| data.data)
            .unwrap_or_default()
    }
}

pub fn sample_rows() -> Vec<Vec<f64>> {
    vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]
}
