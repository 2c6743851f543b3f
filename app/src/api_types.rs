//! FILENAME: app/src/api_types.rs
// PURPOSE: Shared type definitions exchanged with the grid UI.
// CONTEXT: All structs use camelCase serialization for JavaScript interoperability.

use engine::{Column, ColumnType, GridCoord, ResolvedCell};
use serde::{Deserialize, Serialize};

use crate::view::ViewStatus;

/// Cell data returned to the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    pub row: usize,
    pub col: usize,
    pub display: String,
    /// Value handed to the cell editor; only numeric cells have one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub readonly: bool,
}

impl CellData {
    pub fn from_resolved(coord: GridCoord, cell: &ResolvedCell) -> Self {
        CellData {
            row: coord.row,
            col: coord.col,
            display: cell.display(),
            value: cell.editable_value(),
            readonly: cell.readonly,
        }
    }
}

/// Input for cell edits, single or batch (paste, fill handle).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellUpdateInput {
    pub row: usize,
    pub col: usize,
    pub value: String,
}

impl CellUpdateInput {
    pub fn new(col: usize, row: usize, value: impl Into<String>) -> Self {
        CellUpdateInput {
            row,
            col,
            value: value.into(),
        }
    }
}

/// Column header data for the grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnData {
    pub id: String,
    pub title: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    pub editable: bool,
}

impl From<&Column> for ColumnData {
    fn from(column: &Column) -> Self {
        let kind = match column.column_type {
            ColumnType::Text => "text",
            ColumnType::DateTime => "dateTime",
            ColumnType::Number => "number",
            ColumnType::Aggregate(_) => "aggregate",
        };
        ColumnData {
            id: column.id.clone(),
            title: column.title.clone(),
            kind: kind.to_string(),
            width: column.width,
            editable: column.editable,
        }
    }
}

/// Result of an edit batch
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResult {
    /// Number of cells queued for the next flush
    pub applied: usize,
    pub updated_cells: Vec<CellData>,
    pub pending_count: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Result of an undo/redo operation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoResult {
    pub success: bool,
    /// Description of what was undone/redone
    pub description: Option<String>,
    /// Cells that were modified
    pub updated_cells: Vec<CellData>,
    pub pending_count: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Current view state for the UI toolbar and status line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub status: ViewStatus,
    pub rows: usize,
    pub columns: Vec<ColumnData>,
    pub pending_count: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_description: Option<String>,
    pub redo_description: Option<String>,
    pub read_only: bool,
}
