//! FILENAME: core/engine/src/undo.rs
//! PURPOSE: Undo/Redo history of local matrix edits.
//! CONTEXT: Each user edit (single cell or paste/fill) is one transaction.
//! A transaction remembers the previous and new value of every cell it touched
//! and how long the pending queue was before it, so undo can revert both the
//! matrix and the queue.

use std::collections::VecDeque;

/// Maximum number of undo operations to keep in history.
pub const MAX_HISTORY_SIZE: usize = 100;

/// A single cell change inside a transaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellChange {
    pub row: usize,
    pub col: usize,
    pub previous: f64,
    pub value: f64,
}

/// A transaction groups the cell changes of one edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Human-readable description (e.g., "Paste 10 cells")
    pub description: String,
    /// The individual changes in this transaction (in order applied)
    pub changes: Vec<CellChange>,
    /// Length of the pending queue before this transaction was queued
    pub pending_before: usize,
}

impl Transaction {
    pub fn new(description: impl Into<String>, pending_before: usize) -> Self {
        Transaction {
            description: description.into(),
            changes: Vec::new(),
            pending_before,
        }
    }

    pub fn add_change(&mut self, change: CellChange) {
        self.changes.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

/// The history stack for undo/redo operations.
#[derive(Debug)]
pub struct EditHistory {
    /// Transactions that can be undone (most recent at back)
    undo_stack: VecDeque<Transaction>,
    /// Transactions that were undone and can be redone (most recent at back)
    redo_stack: VecDeque<Transaction>,
    max_size: usize,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::with_max_size(MAX_HISTORY_SIZE)
    }

    pub fn with_max_size(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        EditHistory {
            undo_stack: VecDeque::with_capacity(max_size),
            redo_stack: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Records a new transaction. Empty transactions are ignored.
    /// Any redo history is discarded.
    pub fn record(&mut self, transaction: Transaction) {
        if transaction.is_empty() {
            return;
        }
        self.redo_stack.clear();
        Self::push_bounded(&mut self.undo_stack, transaction, self.max_size);
    }

    /// Pops the most recent transaction and moves it to the redo stack.
    pub fn undo(&mut self) -> Option<&Transaction> {
        let transaction = self.undo_stack.pop_back()?;
        Self::push_bounded(&mut self.redo_stack, transaction, self.max_size);
        self.redo_stack.back()
    }

    /// Pops the most recently undone transaction and moves it back to the undo stack.
    pub fn redo(&mut self) -> Option<&Transaction> {
        let transaction = self.redo_stack.pop_back()?;
        Self::push_bounded(&mut self.undo_stack, transaction, self.max_size);
        self.undo_stack.back()
    }

    fn push_bounded(stack: &mut VecDeque<Transaction>, transaction: Transaction, max_size: usize) {
        while stack.len() >= max_size {
            stack.pop_front();
        }
        stack.push_back(transaction);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Transaction that `undo` would revert next.
    pub fn peek_undo(&self) -> Option<&Transaction> {
        self.undo_stack.back()
    }

    /// Transaction that `redo` would reapply next.
    pub fn peek_redo(&self) -> Option<&Transaction> {
        self.redo_stack.back()
    }

    /// Description of next undo action (for UI).
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|t| t.description.as_str())
    }

    /// Description of next redo action (for UI).
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|t| t.description.as_str())
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Current stack sizes (undo, redo).
    pub fn stack_sizes(&self) -> (usize, usize) {
        (self.undo_stack.len(), self.redo_stack.len())
    }
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new()
    }
}
