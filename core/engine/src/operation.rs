//! FILENAME: core/engine/src/operation.rs
//! PURPOSE: Pending cell updates queued by the edit batching layer.
//! CONTEXT: A pending update pairs a data coordinate with an operation. Local
//! edits always produce `=` operations; the remote store also understands the
//! arithmetic operators, which the in-memory store applies the same way.
//! Wire shape: `{"coordinates": [[col, row]], "operation": {"operation": "=", "value": 1.0}}`.

use serde::{Deserialize, Serialize};

use crate::coord::DataCoord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "ABS")]
    Abs,
}

impl Operator {
    /// Applies the operator to the current cell value.
    pub fn apply(self, current: f64, value: f64) -> f64 {
        match self {
            Operator::Eq => value,
            Operator::Add => current + value,
            Operator::Sub => current - value,
            Operator::Mul => current * value,
            Operator::Div => current / value,
            Operator::Abs => current.abs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub operation: Operator,
    pub value: f64,
}

impl Operation {
    pub fn set(value: f64) -> Self {
        Operation {
            operation: Operator::Eq,
            value,
        }
    }

    pub fn apply(&self, current: f64) -> f64 {
        self.operation.apply(current, self.value)
    }
}

/// One queued cell edit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireUpdate", try_from = "WireUpdate")]
pub struct PendingUpdate {
    pub coordinates: DataCoord,
    pub operation: Operation,
}

impl PendingUpdate {
    pub fn set(coordinates: DataCoord, value: f64) -> Self {
        PendingUpdate {
            coordinates,
            operation: Operation::set(value),
        }
    }
}

/// Remote representation; the remote accepts a list of `[col, row]` pairs per operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireUpdate {
    coordinates: Vec<[usize; 2]>,
    operation: Operation,
}

impl From<PendingUpdate> for WireUpdate {
    fn from(update: PendingUpdate) -> Self {
        WireUpdate {
            coordinates: vec![[update.coordinates.col, update.coordinates.row]],
            operation: update.operation,
        }
    }
}

impl TryFrom<WireUpdate> for PendingUpdate {
    type Error = String;

    fn try_from(wire: WireUpdate) -> Result<Self, Self::Error> {
        match wire.coordinates.as_slice() {
            [[col, row]] => Ok(PendingUpdate {
                coordinates: DataCoord::new(*col, *row),
                operation: wire.operation,
            }),
            other => Err(format!("expected exactly one coordinate pair, got {}", other.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_apply() {
        assert_eq!(Operator::Eq.apply(3.0, 7.0), 7.0);
        assert_eq!(Operator::Add.apply(3.0, 7.0), 10.0);
        assert_eq!(Operator::Sub.apply(3.0, 7.0), -4.0);
        assert_eq!(Operator::Mul.apply(3.0, 7.0), 21.0);
        assert_eq!(Operator::Abs.apply(-3.0, 0.0), 3.0);
    }

    #[test]
    fn test_wire_shape() {
        let update = PendingUpdate::set(DataCoord::new(2, 5), 1.5);
        let json = serde_json::to_value(update).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "coordinates": [[2, 5]],
                "operation": { "operation": "=", "value": 1.5 }
            })
        );
    }

    #[test]
    fn test_wire_rejects_multiple_pairs() {
        let json = r#"{"coordinates":[[0,0],[1,1]],"operation":{"operation":"+","value":1.0}}"#;
        assert!(serde_json::from_str::<PendingUpdate>(json).is_err());

        let single = r#"{"coordinates":[[1,4]],"operation":{"operation":"ABS","value":0.0}}"#;
        let update: PendingUpdate = serde_json::from_str(single).unwrap();
        assert_eq!(update.coordinates, DataCoord::new(1, 4));
        assert_eq!(update.operation.operation, Operator::Abs);
    }
}
