//! FILENAME: core/engine/src/aggregate.rs
//! PURPOSE: Row aggregates displayed in read-only aggregate columns.
//! CONTEXT: Each aggregate column shows one statistic computed across the
//! data columns of a row. Series are precomputed for the whole matrix and
//! looked up by column id when cells are resolved.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::matrix::Matrix;

/// Supported row aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateKind {
    Min,
    Max,
    Avg,
    Total,
}

impl AggregateKind {
    pub const ALL: [AggregateKind; 4] = [
        AggregateKind::Min,
        AggregateKind::Max,
        AggregateKind::Avg,
        AggregateKind::Total,
    ];

    /// Stable id used as the column id of the aggregate column.
    pub fn id(self) -> &'static str {
        match self {
            AggregateKind::Min => "min",
            AggregateKind::Max => "max",
            AggregateKind::Avg => "avg",
            AggregateKind::Total => "total",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AggregateKind::Min => "Min.",
            AggregateKind::Max => "Max.",
            AggregateKind::Avg => "Avg.",
            AggregateKind::Total => "Total",
        }
    }

    /// Computes the aggregate over one row. Empty rows have no value.
    pub fn compute(self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let result = match self {
            AggregateKind::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            AggregateKind::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            AggregateKind::Total => values.iter().sum(),
            AggregateKind::Avg => values.iter().sum::<f64>() / values.len() as f64,
        };
        Some(result)
    }
}

/// Precomputed per-row aggregate values, one series per aggregate kind.
/// Any column typed `Aggregate(kind)` reads the series of its kind,
/// whatever its id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateSeries {
    series: HashMap<AggregateKind, Vec<Option<f64>>>,
}

impl AggregateSeries {
    pub fn new() -> Self {
        AggregateSeries::default()
    }

    pub fn compute(matrix: &Matrix, kinds: &[AggregateKind]) -> Self {
        let mut series = HashMap::with_capacity(kinds.len());
        for kind in kinds {
            let values = matrix.iter_rows().map(|row| kind.compute(row)).collect();
            series.insert(*kind, values);
        }
        AggregateSeries { series }
    }

    /// Aggregate value of `kind` for `row`.
    pub fn value(&self, kind: AggregateKind, row: usize) -> Option<f64> {
        self.series
            .get(&kind)
            .and_then(|values| values.get(row))
            .copied()
            .flatten()
    }
}
