//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the matrix grid engine.
//! CONTEXT: Re-exports public types and modules for use by other crates.
//! Everything here is pure and synchronous; remote I/O lives in `persistence`.

pub mod aggregate;
pub mod cell;
pub mod column;
pub mod coord;
pub mod edit;
pub mod matrix;
pub mod operation;
pub mod time_index;
pub mod undo;

// Re-export commonly used types at the crate root
pub use aggregate::{AggregateKind, AggregateSeries};
pub use cell::{format_number, CellContent, CellResolver, ResolvedCell, PLACEHOLDER_TEXT};
pub use column::{
    Column, ColumnModel, ColumnOptions, ColumnType, DATE_TIME_COLUMN_ID, ROW_HEADER_COLUMN_ID,
};
pub use coord::{CoordinateMapper, DataCoord, GridCoord, MapperCache};
pub use edit::{parse_value, CellEdit, EditBatch};
pub use matrix::{Matrix, MatrixShapeError};
pub use operation::{Operation, Operator, PendingUpdate};
pub use time_index::{
    format_iso, format_label, generate, generate_labels, parse_start_date, DateTimeIndex,
    TimeFrequency, TimeIndexError, TimeMetadata,
};
pub use undo::{CellChange, EditHistory, Transaction, MAX_HISTORY_SIZE};
