//! FILENAME: tests/test_edits.rs
//! Integration tests for local edits, undo/redo and the pending queue.

mod common;

use app_lib::{CellUpdateInput, ViewConfig};
use common::TestHarness;
use engine::{DataCoord, GridCoord, Operator};
use persistence::StoreCall;

fn input(col: usize, row: usize, value: &str) -> CellUpdateInput {
    CellUpdateInput::new(col, row, value)
}

// ============================================================================
// SINGLE & MULTI CELL EDITS
// ============================================================================

#[tokio::test]
async fn test_single_edit_queues_one_update() {
    let mut harness = TestHarness::loaded().await;

    let result = harness.view.edit_cell(GridCoord::new(2, 0), "10");
    assert_eq!(result.applied, 1);
    assert_eq!(result.pending_count, 1);
    assert!(result.can_undo);
    assert_eq!(result.updated_cells[0].display, "10");

    // grid column 2 is data column 1
    let update = &harness.view.pending_updates()[0];
    assert_eq!(update.coordinates, DataCoord::new(1, 0));
    assert_eq!(update.operation.operation, Operator::Eq);
    assert_eq!(update.operation.value, 10.0);

    // nothing reached the remote
    assert_eq!(harness.store.call_count(StoreCall::FlushEdits), 0);
    assert_eq!(harness.remote_rows()[0][1], 2.0);
}

#[tokio::test]
async fn test_multi_edit_queues_in_order() {
    let mut harness = TestHarness::loaded().await;
    harness.view.edit_cell(GridCoord::new(1, 0), "7");

    let result =
        harness.view.edit_cells(&[input(1, 1, "8"), input(2, 1, "9"), input(1, 2, "-1.5")]);
    assert_eq!(result.applied, 3);
    assert_eq!(harness.view.pending_count(), 4);

    let coords: Vec<DataCoord> = harness
        .view
        .pending_updates()
        .iter()
        .map(|u| u.coordinates)
        .collect();
    assert_eq!(
        coords,
        vec![
            DataCoord::new(0, 0),
            DataCoord::new(0, 1),
            DataCoord::new(1, 1),
            DataCoord::new(0, 2),
        ]
    );
    assert_eq!(harness.display(1, 2), "-1.5");
}

#[tokio::test]
async fn test_non_numeric_and_non_data_edits_ignored() {
    let mut harness = TestHarness::loaded().await;

    let result = harness.view.edit_cells(&[
        input(1, 0, "abc"),
        input(0, 0, "5"),  // date column
        input(9, 0, "5"),  // past the last column
        input(1, 99, "5"), // past the last row
        input(2, 0, " 42 "),
    ]);
    assert_eq!(result.applied, 1);
    assert_eq!(harness.view.pending_count(), 1);
    assert_eq!(harness.display(1, 0), "1");
    assert_eq!(harness.display(2, 0), "42");
}

#[tokio::test]
async fn test_read_only_view_ignores_edits() {
    let mut harness = TestHarness::loaded().await;
    harness.view.set_read_only(true);

    let result = harness.view.edit_cell(GridCoord::new(1, 0), "5");
    assert_eq!(result.applied, 0);
    assert_eq!(harness.view.pending_count(), 0);
    assert_eq!(harness.display(1, 0), "1");
}

#[tokio::test]
async fn test_read_only_toggle_restores_editing() {
    let config = ViewConfig {
        read_only: true,
        ..ViewConfig::default()
    };
    let mut harness = TestHarness::loaded_with(config).await;
    assert!(harness.view.is_read_only());
    assert_eq!(harness.view.edit_cell(GridCoord::new(1, 0), "5").applied, 0);
    assert!(harness.view.resolve_cell(GridCoord::new(1, 0)).readonly);

    harness.view.set_read_only(false);
    assert!(!harness.view.is_read_only());
    assert!(!harness.view.resolve_cell(GridCoord::new(1, 0)).readonly);
    assert!(harness.view.columns().iter().skip(1).all(|c| c.editable));

    let result = harness.view.edit_cell(GridCoord::new(1, 0), "5");
    assert_eq!(result.applied, 1);
    assert_eq!(harness.display(1, 0), "5");
}

#[tokio::test]
async fn test_edits_refresh_aggregates() {
    let config = ViewConfig {
        aggregates: vec![engine::AggregateKind::Max],
        ..ViewConfig::default()
    };
    let mut harness = TestHarness::loaded_with(config).await;
    assert_eq!(harness.display(3, 0), "2");

    harness.view.edit_cell(GridCoord::new(1, 0), "50");
    assert_eq!(harness.display(3, 0), "50");
}

// ============================================================================
// UNDO / REDO
// ============================================================================

#[tokio::test]
async fn test_undo_multi_edit_restores_values_and_queue() {
    let mut harness = TestHarness::loaded().await;
    harness.view.edit_cell(GridCoord::new(1, 0), "7");
    harness.view.edit_cells(&[input(1, 1, "8"), input(2, 1, "9")]);

    let result = harness.view.undo();
    assert!(result.success);
    assert_eq!(result.description.as_deref(), Some("Edit 2 cells"));
    assert_eq!(result.updated_cells.len(), 2);
    assert_eq!(result.pending_count, 1);
    assert_eq!(harness.display(1, 1), "3");
    assert_eq!(harness.display(2, 1), "4");
    assert_eq!(harness.display(1, 0), "7");
}

#[tokio::test]
async fn test_redo_requeues() {
    let mut harness = TestHarness::loaded().await;
    harness.view.edit_cells(&[input(1, 1, "8"), input(2, 1, "9")]);
    harness.view.undo();
    assert_eq!(harness.view.pending_count(), 0);
    assert!(harness.view.can_redo());

    let result = harness.view.redo();
    assert!(result.success);
    assert_eq!(harness.view.pending_count(), 2);
    assert_eq!(harness.display(2, 1), "9");
    assert!(!harness.view.can_redo());
}

#[tokio::test]
async fn test_undo_redo_blocked_while_read_only() {
    let mut harness = TestHarness::loaded().await;
    harness.view.edit_cell(GridCoord::new(1, 0), "7");
    harness.view.set_read_only(true);

    let result = harness.view.undo();
    assert!(!result.success);
    assert_eq!(harness.view.matrix().get(0, 0), Some(7.0));
    assert_eq!(harness.view.pending_count(), 1);
    assert!(harness.view.can_undo());

    harness.view.set_read_only(false);
    assert!(harness.view.undo().success);
    harness.view.set_read_only(true);
    assert!(!harness.view.redo().success);
    assert_eq!(harness.view.matrix().get(0, 0), Some(1.0));
    assert!(harness.view.can_redo());
}

#[tokio::test]
async fn test_undo_with_empty_history() {
    let mut harness = TestHarness::loaded().await;
    let result = harness.view.undo();
    assert!(!result.success);
    assert!(result.description.is_none());
    assert!(result.updated_cells.is_empty());
}

#[tokio::test]
async fn test_close_reports_discarded_edits() {
    let mut harness = TestHarness::loaded().await;
    harness.view.edit_cells(&[input(1, 0, "1.5"), input(2, 0, "2.5")]);

    let discarded = harness.view.close();
    assert_eq!(discarded, 2);
    assert_eq!(harness.store.call_count(StoreCall::FlushEdits), 0);
}
