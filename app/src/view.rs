//! FILENAME: app/src/view.rs
// PURPOSE: One matrix grid view: the state behind a mounted grid.
// CONTEXT: The view owns the matrix snapshot, the column layout, the memoized
// coordinate mapper and the pending edit queue. It is driven from a single UI
// event loop; only fetch, flush and import await the remote store.

use engine::{
    generate, generate_labels, AggregateSeries, CellEdit, CellResolver, ColumnModel, DataCoord,
    EditBatch, GridCoord, Matrix, MapperCache, PendingUpdate, ResolvedCell, TimeMetadata,
};
use persistence::{ImportFile, MatrixData, MatrixStore};
use serde::Serialize;

use crate::api_types::{
    CellData, CellUpdateInput, ColumnData, EditResult, UndoResult, ViewSnapshot,
};
use crate::config::{DateFormat, ViewConfig};
use crate::error::ViewError;
use crate::notifications::{self, Notification, Notifications};
use crate::{log_debug, log_enter, log_exit, log_info, log_warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "camelCase")]
pub enum ViewStatus {
    Idle,
    Loading,
    Ready,
    Error(String),
}

pub struct MatrixView<S: MatrixStore> {
    store: S,
    study_id: String,
    path: String,
    config: ViewConfig,
    read_only: bool,
    status: ViewStatus,
    matrix: Matrix,
    columns: ColumnModel,
    mapper: MapperCache,
    /// Fetched once per view and kept for its lifetime
    time_metadata: Option<TimeMetadata>,
    dates: Vec<String>,
    row_headers: Vec<String>,
    aggregates: AggregateSeries,
    edits: EditBatch,
    notifications: Notifications,
}

impl<S: MatrixStore> MatrixView<S> {
    pub fn new(
        store: S,
        study_id: impl Into<String>,
        path: impl Into<String>,
        config: ViewConfig,
    ) -> Self {
        MatrixView {
            store,
            study_id: study_id.into(),
            path: path.into(),
            read_only: config.read_only,
            edits: EditBatch::with_history_size(config.history_size),
            config,
            status: ViewStatus::Idle,
            matrix: Matrix::new(),
            columns: ColumnModel::default(),
            mapper: MapperCache::new(),
            time_metadata: None,
            dates: Vec::new(),
            row_headers: Vec::new(),
            aggregates: AggregateSeries::new(),
            notifications: Notifications::new(),
        }
    }

    // ========================================================================
    // LOADING
    // ========================================================================

    /// Fetches the matrix (and, the first time, its time index) and rebuilds the
    /// layout. Unflushed edits are discarded.
    pub async fn load(&mut self) -> Result<(), ViewError> {
        log_enter!("VIEW", "load", "study={} path={}", self.study_id, self.path);
        self.status = ViewStatus::Loading;

        let data = match self.store.fetch_matrix(&self.study_id, &self.path).await {
            Ok(data) => data,
            Err(e) => {
                self.fail_load(&e);
                return Err(e.into());
            }
        };
        let matrix = match data.to_matrix() {
            Ok(matrix) => matrix,
            Err(e) => {
                self.fail_load(&e);
                return Err(e.into());
            }
        };

        if self.time_metadata.is_none() {
            match self.store.fetch_time_index(&self.study_id, &self.path).await {
                Ok(metadata) => self.time_metadata = Some(metadata),
                Err(e) => self.notifications.warning(notifications::INDEX_MISSING, &e),
            }
        }

        self.install(matrix, &data);
        log_exit!("VIEW", "load", "rows={} cols={}", self.matrix.rows(), self.matrix.cols());
        Ok(())
    }

    fn install(&mut self, matrix: Matrix, data: &MatrixData) {
        self.dates = match self.time_metadata.as_ref().map(|m| self.date_labels(m)) {
            Some(Ok(dates)) => dates,
            Some(Err(e)) => {
                self.notifications.warning(notifications::INDEX_MISSING, &e);
                Vec::new()
            }
            None => Vec::new(),
        };

        self.row_headers = if data.index.len() == matrix.rows() {
            data.index.iter().map(|i| i.to_string()).collect()
        } else {
            (1..=matrix.rows()).map(|i| i.to_string()).collect()
        };

        let options = self.config.column_options(!self.dates.is_empty());
        self.columns = ColumnModel::for_matrix(matrix.cols(), &options);
        self.matrix = matrix;
        self.edits.reset();
        self.refresh_aggregates();
        self.status = ViewStatus::Ready;
    }

    fn date_labels(&self, metadata: &TimeMetadata) -> Result<Vec<String>, ViewError> {
        Ok(match self.config.date_format {
            DateFormat::Iso => generate(metadata)?,
            DateFormat::Label => generate_labels(metadata)?,
        })
    }

    fn fail_load(&mut self, error: &dyn std::fmt::Display) {
        let message = error.to_string();
        self.matrix = Matrix::new();
        self.columns = ColumnModel::default();
        self.dates.clear();
        self.row_headers.clear();
        self.aggregates = AggregateSeries::new();
        self.edits.reset();
        self.status = ViewStatus::Error(message.clone());
        self.notifications.error(notifications::FETCH_FAILED, message);
    }

    fn refresh_aggregates(&mut self) {
        self.aggregates = AggregateSeries::compute(&self.matrix, &self.columns.aggregate_kinds());
    }

    // ========================================================================
    // READING
    // ========================================================================

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn columns(&self) -> &ColumnModel {
        &self.columns
    }

    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    pub fn time_metadata(&self) -> Option<&TimeMetadata> {
        self.time_metadata.as_ref()
    }

    pub fn row_count(&self) -> usize {
        self.matrix.rows()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Number of coordinate mapper (re)computations so far.
    pub fn mapper_computations(&self) -> usize {
        self.mapper.computations()
    }

    fn resolver(&mut self) -> CellResolver<'_> {
        CellResolver {
            mapper: self.mapper.get(&self.columns),
            columns: &self.columns,
            matrix: &self.matrix,
            dates: &self.dates,
            aggregates: &self.aggregates,
            row_headers: &self.row_headers,
            read_only: self.read_only,
        }
    }

    pub fn resolve_cell(&mut self, coord: GridCoord) -> ResolvedCell {
        self.resolver().resolve(coord)
    }

    /// Cells of an inclusive viewport range, clamped to the grid bounds.
    pub fn viewport_cells(
        &mut self,
        start_row: usize,
        start_col: usize,
        end_row: usize,
        end_col: usize,
    ) -> Vec<CellData> {
        let (rows, cols) = (self.row_count(), self.column_count());
        if rows == 0 || cols == 0 || start_row >= rows || start_col >= cols {
            return Vec::new();
        }
        let end_row = end_row.min(rows - 1);
        let end_col = end_col.min(cols - 1);

        let resolver = self.resolver();
        let mut cells = Vec::with_capacity((end_row + 1 - start_row) * (end_col + 1 - start_col));
        for row in start_row..=end_row {
            for col in start_col..=end_col {
                let coord = GridCoord::new(col, row);
                cells.push(CellData::from_resolved(coord, &resolver.resolve(coord)));
            }
        }
        cells
    }

    fn cell_data(&mut self, coords: &[GridCoord]) -> Vec<CellData> {
        let resolver = self.resolver();
        coords
            .iter()
            .map(|coord| CellData::from_resolved(*coord, &resolver.resolve(*coord)))
            .collect()
    }

    // ========================================================================
    // EDITING
    // ========================================================================

    /// Applies single or multi-cell edits. Edits on non-data, non-editable or
    /// out-of-range cells and non-numeric input are silently dropped.
    pub fn edit_cells(&mut self, inputs: &[CellUpdateInput]) -> EditResult {
        if self.read_only {
            log_debug!("VIEW", "ignoring {} edits on read-only view", inputs.len());
            return self.edit_result(0, Vec::new());
        }

        let mapper = self.mapper.get(&self.columns);
        let mut edits = Vec::with_capacity(inputs.len());
        let mut touched = Vec::with_capacity(inputs.len());

        for input in inputs {
            let coord = GridCoord::new(input.col, input.row);
            let editable = self.columns.get(coord.col).map_or(false, |c| c.editable);
            let Some(data) = mapper.grid_to_data(coord).filter(|_| editable) else {
                continue;
            };
            if !self.matrix.contains(data.row, data.col) {
                continue;
            }
            let Some(edit) = CellEdit::parse(data, &input.value) else {
                log_debug!(
                    "VIEW",
                    "ignoring non-numeric input '{}' at ({}, {})",
                    input.value,
                    coord.row,
                    coord.col
                );
                continue;
            };
            edits.push(edit);
            if !touched.contains(&coord) {
                touched.push(coord);
            }
        }

        let applied = self.edits.apply(&mut self.matrix, edits);
        if applied > 0 {
            self.refresh_aggregates();
        }
        let updated_cells = self.cell_data(&touched);
        self.edit_result(applied, updated_cells)
    }

    /// Convenience for a single cell; same path as `edit_cells`.
    pub fn edit_cell(&mut self, coord: GridCoord, value: &str) -> EditResult {
        self.edit_cells(&[CellUpdateInput::new(coord.col, coord.row, value)])
    }

    fn edit_result(&self, applied: usize, updated_cells: Vec<CellData>) -> EditResult {
        EditResult {
            applied,
            updated_cells,
            pending_count: self.edits.pending_count(),
            can_undo: self.edits.can_undo(),
            can_redo: self.edits.can_redo(),
        }
    }

    /// Reverts the most recent edit batch. No-op on a read-only view.
    pub fn undo(&mut self) -> UndoResult {
        if self.read_only {
            return self.finish_history_step(false, None, Vec::new());
        }
        let (description, coords) = self.transaction_cells(true);
        let success = self.edits.undo(&mut self.matrix);
        self.finish_history_step(success, description, coords)
    }

    /// Reapplies the most recently undone batch. No-op on a read-only view.
    pub fn redo(&mut self) -> UndoResult {
        if self.read_only {
            return self.finish_history_step(false, None, Vec::new());
        }
        let (description, coords) = self.transaction_cells(false);
        let success = self.edits.redo(&mut self.matrix);
        self.finish_history_step(success, description, coords)
    }

    /// Description and grid cells of the transaction undo (or redo) would touch.
    fn transaction_cells(&mut self, undo: bool) -> (Option<String>, Vec<GridCoord>) {
        let history = self.edits.history();
        let next = if undo { history.peek_undo() } else { history.peek_redo() };
        let Some(transaction) = next else {
            return (None, Vec::new());
        };
        let mapper = self.mapper.get(&self.columns);
        let mut coords = Vec::with_capacity(transaction.len());
        for change in &transaction.changes {
            if let Some(coord) = mapper.data_to_grid(DataCoord::new(change.col, change.row)) {
                if !coords.contains(&coord) {
                    coords.push(coord);
                }
            }
        }
        (Some(transaction.description.clone()), coords)
    }

    fn finish_history_step(
        &mut self,
        success: bool,
        description: Option<String>,
        coords: Vec<GridCoord>,
    ) -> UndoResult {
        if success {
            self.refresh_aggregates();
        }
        let updated_cells = if success { self.cell_data(&coords) } else { Vec::new() };
        UndoResult {
            success,
            description: description.filter(|_| success),
            updated_cells,
            pending_count: self.edits.pending_count(),
            can_undo: self.edits.can_undo(),
            can_redo: self.edits.can_redo(),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.edits.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.edits.can_redo()
    }

    pub fn pending_count(&self) -> usize {
        self.edits.pending_count()
    }

    pub fn pending_updates(&self) -> &[PendingUpdate] {
        self.edits.pending()
    }

    // ========================================================================
    // REMOTE
    // ========================================================================

    /// Sends every pending update in one remote call. On failure the queue is
    /// kept so the user can retry.
    pub async fn flush(&mut self) -> Result<usize, ViewError> {
        if !self.edits.is_dirty() {
            return Ok(0);
        }
        let updates = self.edits.take_for_flush();
        log_info!("VIEW", "flushing {} updates to {}", updates.len(), self.path);

        match self.store.flush_edits(&self.study_id, &self.path, &updates).await {
            Ok(()) => {
                self.edits.mark_flushed(updates.len());
                self.notifications.success(notifications::FLUSH_SUCCESS);
                Ok(updates.len())
            }
            Err(e) => {
                self.notifications.error(notifications::FLUSH_FAILED, &e);
                Err(e.into())
            }
        }
    }

    /// Replaces the matrix with an uploaded file, then reloads it.
    /// Pending edits are discarded by the reload.
    pub async fn import(&mut self, file: &ImportFile) -> Result<(), ViewError> {
        if self.read_only {
            return Err(ViewError::ReadOnly);
        }
        log_info!("VIEW", "importing {} into {}", file.name, self.path);

        if let Err(e) = self.store.import_file(file, &self.study_id, &self.path).await {
            self.notifications.error(notifications::IMPORT_FAILED, &e);
            return Err(e.into());
        }
        self.notifications.success(notifications::IMPORT_SUCCESS);
        self.load().await
    }

    // ========================================================================
    // LAYOUT & LIFECYCLE
    // ========================================================================

    /// Replaces the column layout. The mapper is rebuilt on next use if the
    /// layout differs from the current one.
    pub fn set_columns(&mut self, columns: ColumnModel) {
        let duplicates = columns.duplicate_ids();
        if !duplicates.is_empty() {
            log_warn!("VIEW", "duplicate column ids: {}", duplicates.join(", "));
        }
        self.columns = columns;
        self.refresh_aggregates();
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.take()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let history = self.edits.history();
        ViewSnapshot {
            status: self.status.clone(),
            rows: self.matrix.rows(),
            columns: self.columns.iter().map(ColumnData::from).collect(),
            pending_count: self.edits.pending_count(),
            can_undo: history.can_undo(),
            can_redo: history.can_redo(),
            undo_description: history.undo_description().map(String::from),
            redo_description: history.redo_description().map(String::from),
            read_only: self.read_only,
        }
    }

    /// Unmounts the view. Unflushed edits are dropped; returns how many.
    pub fn close(mut self) -> usize {
        let discarded = self.edits.pending_count();
        if discarded > 0 {
            log_warn!("VIEW", "discarding {} unflushed edits for {}", discarded, self.path);
        }
        self.edits.reset();
        discarded
    }
}
