//! FILENAME: core/engine/src/cell.rs
//! PURPOSE: Resolves what a grid cell displays and whether it can be edited.
//! CONTEXT: The resolver dispatches on the column type of the requested grid
//! column. It never panics: unknown columns resolve to an "N/A" placeholder
//! and rows past the data resolve to empty content.

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateSeries;
use crate::column::{ColumnModel, ColumnType};
use crate::coord::{CoordinateMapper, GridCoord};
use crate::matrix::Matrix;

/// Text shown for columns outside the column model.
pub const PLACEHOLDER_TEXT: &str = "N/A";

/// The content of a resolved cell, by column type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum CellContent {
    Text(String),
    DateTime(String),
    Number(Option<f64>),
    Aggregate(Option<f64>),
    Placeholder(String),
}

/// Rendering descriptor for one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCell {
    pub content: CellContent,
    pub readonly: bool,
}

impl ResolvedCell {
    pub fn placeholder() -> Self {
        ResolvedCell {
            content: CellContent::Placeholder(PLACEHOLDER_TEXT.to_string()),
            readonly: true,
        }
    }

    /// Display text of the cell.
    pub fn display(&self) -> String {
        match &self.content {
            CellContent::Text(s) | CellContent::DateTime(s) | CellContent::Placeholder(s) => {
                s.clone()
            }
            CellContent::Number(value) | CellContent::Aggregate(value) => {
                value.map(format_number).unwrap_or_default()
            }
        }
    }

    /// Value presented to an editor. Only numeric cells carry one.
    pub fn editable_value(&self) -> Option<f64> {
        match self.content {
            CellContent::Number(value) => value,
            _ => None,
        }
    }
}

/// Formats without unnecessary decimal places.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

/// Borrowed view over everything needed to resolve cells of one grid.
#[derive(Debug, Clone, Copy)]
pub struct CellResolver<'a> {
    pub columns: &'a ColumnModel,
    pub mapper: &'a CoordinateMapper,
    pub matrix: &'a Matrix,
    /// Display string per row for `DateTime` columns.
    pub dates: &'a [String],
    pub aggregates: &'a AggregateSeries,
    /// Labels for `Text` columns, per row.
    pub row_headers: &'a [String],
    /// When set, every cell is read-only regardless of its column.
    pub read_only: bool,
}

impl<'a> CellResolver<'a> {
    pub fn resolve(&self, coord: GridCoord) -> ResolvedCell {
        let Some(column) = self.columns.get(coord.col) else {
            return ResolvedCell::placeholder();
        };

        let (content, readonly) = match column.column_type {
            ColumnType::Text => (CellContent::Text(row_label(self.row_headers, coord.row)), true),
            ColumnType::DateTime => (CellContent::DateTime(row_label(self.dates, coord.row)), true),
            ColumnType::Number => {
                let value = self
                    .mapper
                    .grid_to_data(coord)
                    .and_then(|data| self.matrix.get(data.row, data.col));
                (CellContent::Number(value), !column.editable)
            }
            ColumnType::Aggregate(kind) => (
                CellContent::Aggregate(self.aggregates.value(kind, coord.row)),
                true,
            ),
        };

        ResolvedCell {
            content,
            readonly: readonly || self.read_only,
        }
    }
}

fn row_label(labels: &[String], row: usize) -> String {
    labels.get(row).cloned().unwrap_or_default()
}
