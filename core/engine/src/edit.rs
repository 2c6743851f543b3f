//! FILENAME: core/engine/src/edit.rs
//! PURPOSE: Edit batching layer between grid edits and the remote store.
//! CONTEXT: Edits are applied optimistically to the local matrix and queued as
//! pending updates until the view flushes them in one remote call. Single-cell
//! and multi-cell edits share one entry point (`EditBatch::apply`); a single
//! cell is a batch of one. Nothing in this module talks to the remote.

use crate::coord::DataCoord;
use crate::matrix::Matrix;
use crate::operation::PendingUpdate;
use crate::undo::{CellChange, EditHistory, Transaction};

/// A requested value for one matrix cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellEdit {
    pub coord: DataCoord,
    pub value: f64,
}

impl CellEdit {
    pub fn new(coord: DataCoord, value: f64) -> Self {
        CellEdit { coord, value }
    }

    /// Parses user input. Non-numeric or non-finite text yields `None`.
    pub fn parse(coord: DataCoord, raw: &str) -> Option<Self> {
        Some(CellEdit::new(coord, parse_value(raw)?))
    }
}

/// Parses a cell value typed or imported by the user. `NaN` and infinities
/// are rejected: the matrix only holds finite numbers.
pub fn parse_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Pending update queue plus the undo history of unflushed edits.
#[derive(Debug, Default)]
pub struct EditBatch {
    pending: Vec<PendingUpdate>,
    history: EditHistory,
}

impl EditBatch {
    pub fn new() -> Self {
        EditBatch::default()
    }

    pub fn with_history_size(size: usize) -> Self {
        EditBatch {
            pending: Vec::new(),
            history: EditHistory::with_max_size(size),
        }
    }

    /// Applies edits to the matrix and queues one pending update per applied cell,
    /// in the order given. Coordinates outside the matrix are skipped.
    /// Returns the number of updates queued.
    pub fn apply<I>(&mut self, matrix: &mut Matrix, edits: I) -> usize
    where
        I: IntoIterator<Item = CellEdit>,
    {
        let mut transaction = Transaction::new(String::new(), self.pending.len());

        for edit in edits {
            let DataCoord { col, row } = edit.coord;
            match matrix.set(row, col, edit.value) {
                Some(previous) => {
                    transaction.add_change(CellChange {
                        row,
                        col,
                        previous,
                        value: edit.value,
                    });
                    self.pending.push(PendingUpdate::set(edit.coord, edit.value));
                }
                None => log::debug!("skipping edit outside matrix at ({}, {})", row, col),
            }
        }

        let applied = transaction.len();
        transaction.description = match transaction.changes.first() {
            Some(change) if applied == 1 => format!("Edit cell ({}, {})", change.row, change.col),
            _ => format!("Edit {} cells", applied),
        };
        self.history.record(transaction);
        applied
    }

    /// Reverts the most recent batch in the matrix and drops its pending updates.
    pub fn undo(&mut self, matrix: &mut Matrix) -> bool {
        let Some(transaction) = self.history.undo() else {
            return false;
        };
        for change in transaction.changes.iter().rev() {
            matrix.set(change.row, change.col, change.previous);
        }
        self.pending.truncate(transaction.pending_before);
        true
    }

    /// Reapplies the most recently undone batch and queues its updates again.
    pub fn redo(&mut self, matrix: &mut Matrix) -> bool {
        let Some(transaction) = self.history.redo() else {
            return false;
        };
        self.pending.truncate(transaction.pending_before);
        for change in &transaction.changes {
            matrix.set(change.row, change.col, change.value);
            self.pending
                .push(PendingUpdate::set(DataCoord::new(change.col, change.row), change.value));
        }
        true
    }

    pub fn pending(&self) -> &[PendingUpdate] {
        &self.pending
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    /// Snapshot of the queue to send in one remote call.
    pub fn take_for_flush(&self) -> Vec<PendingUpdate> {
        self.pending.clone()
    }

    /// Drops the first `count` updates once the remote accepted them.
    /// History is cleared: the remote now holds those values.
    pub fn mark_flushed(&mut self, count: usize) {
        let count = count.min(self.pending.len());
        self.pending.drain(..count);
        self.history.clear();
    }

    /// Discards every unflushed edit and the history.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.history.clear();
    }
}
