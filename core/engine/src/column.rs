//! FILENAME: core/engine/src/column.rs
//! PURPOSE: Column model of a matrix grid view.
//! CONTEXT: The grid shows an ordered list of typed columns. Only `Number`
//! columns are backed by the matrix; they map 1:1 and in order onto the
//! matrix data columns. Text, DateTime and Aggregate columns are derived.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateKind;

/// Column id of the synthetic row-header column.
pub const ROW_HEADER_COLUMN_ID: &str = "rowHeaders";
/// Column id of the date/time column.
pub const DATE_TIME_COLUMN_ID: &str = "date";

/// What a grid column displays and where its content comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "aggregate", rename_all = "camelCase")]
pub enum ColumnType {
    /// Row header labels, not backed by data.
    Text,
    /// Date/time label of the row, from the time index.
    DateTime,
    /// A matrix data column.
    Number,
    /// A row aggregate across the data columns.
    Aggregate(AggregateKind),
}

impl ColumnType {
    pub fn is_data(self) -> bool {
        matches!(self, ColumnType::Number)
    }
}

/// Describes a single grid column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub title: String,
    pub column_type: ColumnType,
    /// Display width in pixels; `None` lets the grid decide.
    pub width: Option<f64>,
    pub editable: bool,
}

impl Column {
    pub fn new(id: impl Into<String>, title: impl Into<String>, column_type: ColumnType) -> Self {
        Column {
            id: id.into(),
            title: title.into(),
            column_type,
            width: None,
            editable: column_type.is_data(),
        }
    }

    pub fn text(id: impl Into<String>, title: impl Into<String>) -> Self {
        Column::new(id, title, ColumnType::Text)
    }

    pub fn date_time(id: impl Into<String>, title: impl Into<String>) -> Self {
        Column::new(id, title, ColumnType::DateTime)
    }

    pub fn number(id: impl Into<String>, title: impl Into<String>) -> Self {
        Column::new(id, title, ColumnType::Number)
    }

    pub fn aggregate(kind: AggregateKind) -> Self {
        Column::new(kind.id(), kind.title(), ColumnType::Aggregate(kind))
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }
}

/// Options for building the standard layout of a matrix view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnOptions {
    /// Prepend a row header column.
    pub row_headers: bool,
    /// Prepend a date/time column.
    pub date_time: bool,
    /// Titles for data columns; missing titles default to "TS n".
    pub titles: Vec<String>,
    /// Aggregate columns appended after the data columns.
    pub aggregates: Vec<AggregateKind>,
}

/// The ordered column list of one grid view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnModel {
    columns: Vec<Column>,
}

impl ColumnModel {
    pub fn new(columns: Vec<Column>) -> Self {
        ColumnModel { columns }
    }

    /// Builds the standard layout: [row headers] [date] data... aggregates...
    pub fn for_matrix(data_columns: usize, options: &ColumnOptions) -> Self {
        let mut columns = Vec::with_capacity(data_columns + options.aggregates.len() + 2);

        if options.row_headers {
            columns.push(Column::text(ROW_HEADER_COLUMN_ID, ""));
        }
        if options.date_time {
            columns.push(Column::date_time(DATE_TIME_COLUMN_ID, "Date"));
        }
        for index in 0..data_columns {
            let title = options
                .titles
                .get(index)
                .cloned()
                .unwrap_or_else(|| format!("TS {}", index + 1));
            columns.push(Column::number(format!("data{}", index), title));
        }
        for kind in &options.aggregates {
            columns.push(Column::aggregate(*kind));
        }

        ColumnModel { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column at a display index.
    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Display index of the first column with this id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    pub fn data_column_count(&self) -> usize {
        self.columns.iter().filter(|c| c.column_type.is_data()).count()
    }

    /// Aggregate kinds present in the layout, in display order.
    pub fn aggregate_kinds(&self) -> Vec<AggregateKind> {
        self.columns
            .iter()
            .filter_map(|c| match c.column_type {
                ColumnType::Aggregate(kind) => Some(kind),
                _ => None,
            })
            .collect()
    }

    /// Ids that appear more than once. Uniqueness is expected but not enforced.
    pub fn duplicate_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for column in &self.columns {
            if !seen.insert(column.id.as_str()) && !duplicates.contains(&column.id.as_str()) {
                duplicates.push(column.id.as_str());
            }
        }
        duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_layout_order() {
        let options = ColumnOptions {
            row_headers: true,
            date_time: true,
            titles: vec!["Load".to_string()],
            aggregates: vec![AggregateKind::Min, AggregateKind::Total],
        };
        let model = ColumnModel::for_matrix(2, &options);

        let types: Vec<ColumnType> = model.iter().map(|c| c.column_type).collect();
        assert_eq!(
            types,
            vec![
                ColumnType::Text,
                ColumnType::DateTime,
                ColumnType::Number,
                ColumnType::Number,
                ColumnType::Aggregate(AggregateKind::Min),
                ColumnType::Aggregate(AggregateKind::Total),
            ]
        );
        assert_eq!(model.get(2).unwrap().title, "Load");
        assert_eq!(model.get(3).unwrap().title, "TS 2");
        assert_eq!(model.data_column_count(), 2);
        assert_eq!(model.position("total"), Some(5));
    }

    #[test]
    fn test_layout_data_columns_editable() {
        let model = ColumnModel::for_matrix(3, &ColumnOptions::default());
        assert_eq!(model.len(), 3);
        assert!(model.iter().all(|c| c.editable));
    }

    #[test]
    fn test_only_number_columns_editable_by_default() {
        assert!(Column::number("a", "A").editable);
        assert!(!Column::text("b", "B").editable);
        assert!(!Column::date_time("c", "C").editable);
        assert!(!Column::aggregate(AggregateKind::Max).editable);
    }

    #[test]
    fn test_duplicate_ids_reported() {
        let model = ColumnModel::new(vec![
            Column::number("a", "A"),
            Column::number("a", "A again"),
            Column::number("a", "A thrice"),
            Column::number("b", "B"),
        ]);
        assert_eq!(model.duplicate_ids(), vec!["a"]);
    }
}
