use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cycle::{CycleId, TradeDirection};
use crate::values::{Quantity, Timestamp};

/// One leg of a `Deal`: a concrete, lot-rounded order to place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub symbol: String,
    pub direction: TradeDirection,
    pub quantity: Quantity,
}

impl Action {
    pub fn new(symbol: impl Into<String>, direction: TradeDirection, quantity: Quantity) -> Self {
        Self {
            symbol: symbol.into(),
            direction,
            quantity,
        }
    }
}

/// A specific, sized, three-leg plan produced by the optimizer for a single
/// cycle evaluation.
///
/// `expected_profit` is a dimensionless fraction of `start_qty` in the base
/// asset (e.g. `0.0023` = 0.23%). `timestamp` is the oldest book timestamp
/// among the three pairs at the moment of computation (see
/// `Matrix::snapshot`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub cycle_id: CycleId,
    pub start_qty: Decimal,
    pub expected_profit: Decimal,
    pub timestamp: Timestamp,
    pub actions: [Action; 3],
}

impl Deal {
    pub fn new(
        cycle_id: CycleId,
        start_qty: Decimal,
        expected_profit: Decimal,
        timestamp: Timestamp,
        actions: [Action; 3],
    ) -> Self {
        Self {
            cycle_id,
            start_qty,
            expected_profit,
            timestamp,
            actions,
        }
    }
}
