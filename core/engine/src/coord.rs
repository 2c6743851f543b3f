//! FILENAME: core/engine/src/coord.rs
//! PURPOSE: Conversion between grid space and data space coordinates.
//! CONTEXT: The grid displays decorative columns (row headers, dates,
//! aggregates) interleaved with matrix data columns. Grid column `g` maps to
//! data column `d` when it is the d-th `Number` column in display order.
//! Rows are identical in both spaces.

use serde::{Deserialize, Serialize};

use crate::column::ColumnModel;

/// A cell position as displayed: column index includes non-data columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    pub col: usize,
    pub row: usize,
}

impl GridCoord {
    pub fn new(col: usize, row: usize) -> Self {
        GridCoord { col, row }
    }
}

/// A cell position inside the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataCoord {
    pub col: usize,
    pub row: usize,
}

impl DataCoord {
    pub fn new(col: usize, row: usize) -> Self {
        DataCoord { col, row }
    }
}

/// Bidirectional column index mapping derived from a column model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoordinateMapper {
    /// grid column -> data column (None for non-data columns)
    grid_to_data: Vec<Option<usize>>,
    /// data column -> grid column
    data_to_grid: Vec<usize>,
}

impl CoordinateMapper {
    pub fn new(columns: &ColumnModel) -> Self {
        let mut grid_to_data = Vec::with_capacity(columns.len());
        let mut data_to_grid = Vec::new();

        for (grid_col, column) in columns.iter().enumerate() {
            if column.column_type.is_data() {
                grid_to_data.push(Some(data_to_grid.len()));
                data_to_grid.push(grid_col);
            } else {
                grid_to_data.push(None);
            }
        }

        CoordinateMapper {
            grid_to_data,
            data_to_grid,
        }
    }

    /// Returns `None` when the grid column is not a data column or is out of range.
    pub fn grid_to_data(&self, coord: GridCoord) -> Option<DataCoord> {
        let data_col = self.grid_to_data.get(coord.col).copied().flatten()?;
        Some(DataCoord::new(data_col, coord.row))
    }

    /// Returns `None` when no grid column displays this data column,
    /// which includes every coordinate of a layout without data columns.
    pub fn data_to_grid(&self, coord: DataCoord) -> Option<GridCoord> {
        let grid_col = self.data_to_grid.get(coord.col).copied()?;
        Some(GridCoord::new(grid_col, coord.row))
    }

    pub fn data_column_count(&self) -> usize {
        self.data_to_grid.len()
    }
}

/// Memoized mapper owned by a grid view.
/// The mapper is rebuilt only when the column list value changes.
#[derive(Debug, Default)]
pub struct MapperCache {
    key: Option<ColumnModel>,
    mapper: CoordinateMapper,
    computations: usize,
}

impl MapperCache {
    pub fn new() -> Self {
        MapperCache::default()
    }

    pub fn get(&mut self, columns: &ColumnModel) -> &CoordinateMapper {
        if self.key.as_ref() != Some(columns) {
            self.mapper = CoordinateMapper::new(columns);
            self.key = Some(columns.clone());
            self.computations += 1;
        }
        &self.mapper
    }

    /// Number of times the mapper has been (re)built.
    pub fn computations(&self) -> usize {
        self.computations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AggregateKind;
    use crate::column::{Column, ColumnModel};

    fn layout() -> ColumnModel {
        ColumnModel::new(vec![
            Column::text("rowHeaders", ""),
            Column::date_time("date", "Date"),
            Column::number("data0", "TS 1"),
            Column::aggregate(AggregateKind::Min),
            Column::number("data1", "TS 2"),
        ])
    }

    #[test]
    fn test_non_data_columns_map_to_none() {
        let mapper = CoordinateMapper::new(&layout());
        assert_eq!(mapper.grid_to_data(GridCoord::new(0, 3)), None);
        assert_eq!(mapper.grid_to_data(GridCoord::new(1, 3)), None);
        assert_eq!(mapper.grid_to_data(GridCoord::new(3, 3)), None);
        assert_eq!(mapper.grid_to_data(GridCoord::new(99, 3)), None);
    }

    #[test]
    fn test_data_columns_ranked_in_display_order() {
        let mapper = CoordinateMapper::new(&layout());
        assert_eq!(mapper.grid_to_data(GridCoord::new(2, 7)), Some(DataCoord::new(0, 7)));
        assert_eq!(mapper.grid_to_data(GridCoord::new(4, 7)), Some(DataCoord::new(1, 7)));
    }

    #[test]
    fn test_round_trip_for_data_columns() {
        let columns = layout();
        let mapper = CoordinateMapper::new(&columns);
        for (col, column) in columns.iter().enumerate() {
            if !column.column_type.is_data() {
                continue;
            }
            let coord = GridCoord::new(col, 11);
            let data = mapper.grid_to_data(coord).unwrap();
            assert_eq!(mapper.data_to_grid(data), Some(coord));
        }
    }

    #[test]
    fn test_injective_onto_data_range() {
        let columns = layout();
        let mapper = CoordinateMapper::new(&columns);
        let mut mapped: Vec<usize> = (0..columns.len())
            .filter_map(|col| mapper.grid_to_data(GridCoord::new(col, 0)))
            .map(|d| d.col)
            .collect();
        let nulls = columns.len() - mapped.len();
        mapped.sort_unstable();
        assert_eq!(mapped, vec![0, 1]);
        assert_eq!(nulls, 3);
    }

    #[test]
    fn test_data_to_grid_without_data_columns() {
        let columns = ColumnModel::new(vec![Column::text("rowHeaders", "")]);
        let mapper = CoordinateMapper::new(&columns);
        assert_eq!(mapper.data_to_grid(DataCoord::new(0, 0)), None);
        assert_eq!(mapper.data_column_count(), 0);
    }

    #[test]
    fn test_cache_recomputes_only_on_value_change() {
        let mut cache = MapperCache::new();
        let columns = layout();

        cache.get(&columns);
        cache.get(&columns.clone());
        assert_eq!(cache.computations(), 1);

        let changed = ColumnModel::new(vec![Column::number("data0", "TS 1")]);
        let mapper = cache.get(&changed);
        assert_eq!(mapper.grid_to_data(GridCoord::new(0, 0)), Some(DataCoord::new(0, 0)));
        assert_eq!(cache.computations(), 2);
    }
}
