//! FILENAME: core/engine/src/matrix.rs
//! PURPOSE: Dense numeric matrix backing a grid view.
//! CONTEXT: The matrix is the source of truth for every `Number` column in the
//! grid. It is fetched as an immutable snapshot and mutated only through the
//! edit batching layer (optimistic local updates). Rows and columns are 0-based.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a payload is not rectangular.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row {row} has {found} values, expected {expected}")]
pub struct MatrixShapeError {
    pub row: usize,
    pub expected: usize,
    pub found: usize,
}

/// A rectangular `rows x cols` array of numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    data: Vec<Vec<f64>>,
    cols: usize,
}

impl Matrix {
    /// Creates an empty matrix (0 rows, 0 columns).
    pub fn new() -> Self {
        Matrix::default()
    }

    /// Creates a `rows x cols` matrix filled with `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Matrix {
            data: vec![vec![value; cols]; rows],
            cols,
        }
    }

    /// Builds a matrix from row vectors. Every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MatrixShapeError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != cols {
                return Err(MatrixShapeError {
                    row,
                    expected: cols,
                    found: values.len(),
                });
            }
        }
        Ok(Matrix { data: rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.data.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty() || self.cols == 0
    }

    /// Reads a value. Out-of-range coordinates yield `None` rather than panicking,
    /// since the grid may ask for rows beyond the loaded data while scrolling.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Writes a value and returns the previous one.
    /// Returns `None` and leaves the matrix untouched when out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Option<f64> {
        let slot = self.data.get_mut(row).and_then(|r| r.get_mut(col))?;
        let previous = *slot;
        *slot = value;
        Some(previous)
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows() && col < self.cols
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.iter().map(Vec::as_slice)
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.data
    }
}
