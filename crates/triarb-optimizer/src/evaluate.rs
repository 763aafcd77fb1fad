use rust_decimal::Decimal;

use triarb_core::{BookSide, Cycle, OrderBook};

use crate::consume::{consume_base, consume_quote};

/// Result of walking all three legs of a cycle for a single starting
/// quantity `x0`.
#[derive(Debug, Clone, Copy)]
pub struct LegResult {
    /// The leg's order quantity, always expressed in the pair's base asset.
    /// For a `SELL` leg this is the amount given (known up front); for a
    /// `BUY` leg it is the amount received (only known after walking the
    /// book), matching how a Binance-style exchange always reports order
    /// `quantity` in base-asset units regardless of side.
    pub order_qty: Decimal,
}

/// Full result of evaluating one cycle at one starting quantity.
#[derive(Debug, Clone, Copy)]
pub struct CycleEvaluation {
    pub legs: [LegResult; 3],
    pub final_qty: Decimal,
}

/// Walk all three legs of `cycle` against `books` starting from `x0` units
/// of `cycle.base`, applying `fee` (a multiplicative factor, e.g. `0.999`
/// for a 0.1% taker fee) once per leg on the received side.
///
/// `books[i]` must correspond to `cycle.action_tape[i]` (i.e. the order
/// returned by `Cycle::symbols`). Returns `None` if any leg cannot be fully
/// filled against the available depth.
pub fn evaluate_cycle(cycle: &Cycle, books: &[OrderBook; 3], fee: Decimal, x0: Decimal) -> Option<CycleEvaluation> {
    let mut qty = x0;
    let mut legs = [LegResult { order_qty: Decimal::ZERO }; 3];

    for (i, leg) in cycle.action_tape.iter().enumerate() {
        let book = &books[i];
        match leg.side {
            BookSide::Bids => {
                // SELL: qty is base given, walk bids for quote proceeds.
                let proceeds = consume_base(&book.bids, qty)?;
                legs[i] = LegResult { order_qty: qty };
                qty = proceeds * fee;
            }
            BookSide::Asks => {
                // BUY: qty is quote budget, walk asks for base received.
                let received = consume_quote(&book.asks, qty)?;
                legs[i] = LegResult { order_qty: received };
                qty = received * fee;
            }
        }
    }

    Some(CycleEvaluation {
        legs,
        final_qty: qty,
    })
}
