use rust_decimal::Decimal;

use triarb_core::{Cycle, Deal, OrderBook};

use crate::evaluate::evaluate_cycle;
use crate::grid::Grid;

/// Fixed parameters an `Optimizer` run needs beyond the cycle and its books.
#[derive(Debug, Clone, Copy)]
pub struct OptimizerConfig {
    /// Taker fee as a fraction (e.g. `0.001` for 0.1%), applied once per leg
    /// on the received side.
    pub taker_fee: Decimal,
    pub grid: Grid,
}

impl OptimizerConfig {
    /// `1 - taker_fee`, the multiplicative factor applied to each leg's
    /// proceeds.
    fn fee_factor(&self) -> Decimal {
        Decimal::ONE - self.taker_fee
    }
}

/// Search `config.grid` for the starting quantity maximizing expected
/// profit for `cycle` against `books`, returning the `Deal` with quantities
/// rounded down to each leg's lot step and profit recomputed on those
/// rounded quantities, or `None` (no-deal) if no grid point fully fills or
/// the cycle is unprofitable everywhere.
///
/// `books[i]` must correspond to `cycle.action_tape[i]`.
pub fn optimize(cycle: &Cycle, books: &[OrderBook; 3], config: &OptimizerConfig, timestamp: triarb_core::Timestamp) -> Option<Deal> {
    let fee = config.fee_factor();
    let pairs = [&cycle.start, &cycle.middle, &cycle.end];

    let mut best: Option<(Decimal, Decimal, [Decimal; 3])> = None; // (x0, profit, raw order qtys)

    for x0 in config.grid.values() {
        if x0 <= Decimal::ZERO {
            continue;
        }
        let Some(evaluation) = evaluate_cycle(cycle, books, fee, x0) else {
            continue;
        };
        let profit = (evaluation.final_qty - x0) / x0;
        let order_qtys = [
            evaluation.legs[0].order_qty,
            evaluation.legs[1].order_qty,
            evaluation.legs[2].order_qty,
        ];
        match &best {
            Some((_, best_profit, _)) if profit <= *best_profit => {}
            _ => best = Some((x0, profit, order_qtys)),
        }
    }

    let Some((x0, _raw_profit, raw_qtys)) = best else {
        log::debug!("no grid point fully fills cycle {}", cycle.id);
        return None;
    };

    // Round each leg's order quantity down to its pair's lot step, then
    // recompute the profit on those rounded sizes so the reported number
    // reflects what could actually be executed. For a `SELL` leg the
    // rounded quantity is its exact book input, so we re-walk the book for
    // it; for a `BUY` leg the rounded quantity is already its downstream
    // output (base received), so it feeds forward directly without an
    // inverse book walk. This can only understate the realized proceeds
    // relative to the raw (unrounded) pass, never overstate them.
    let rounded_qtys: [Decimal; 3] = [
        pairs[0].round_down(raw_qtys[0]),
        pairs[1].round_down(raw_qtys[1]),
        pairs[2].round_down(raw_qtys[2]),
    ];

    if rounded_qtys[0] <= Decimal::ZERO {
        return None;
    }

    let rounded_x0 = match cycle.action_tape[0].side {
        triarb_core::BookSide::Bids => rounded_qtys[0],
        triarb_core::BookSide::Asks => {
            if raw_qtys[0].is_zero() {
                Decimal::ZERO
            } else {
                x0 * (rounded_qtys[0] / raw_qtys[0])
            }
        }
    };
    if rounded_x0 <= Decimal::ZERO {
        return None;
    }

    let mut final_qty = rounded_x0;
    for (i, leg) in cycle.action_tape.iter().enumerate() {
        final_qty = match leg.side {
            triarb_core::BookSide::Bids => {
                let Some(proceeds) = crate::consume::consume_base(&books[i].bids, rounded_qtys[i]) else {
                    return None;
                };
                proceeds * fee
            }
            triarb_core::BookSide::Asks => rounded_qtys[i] * fee,
        };
    }

    let rounded_profit = (final_qty - rounded_x0) / rounded_x0;

    let actions = [
        triarb_core::Action::new(cycle.action_tape[0].symbol.clone(), cycle.action_tape[0].direction, rounded_qtys[0]),
        triarb_core::Action::new(cycle.action_tape[1].symbol.clone(), cycle.action_tape[1].direction, rounded_qtys[1]),
        triarb_core::Action::new(cycle.action_tape[2].symbol.clone(), cycle.action_tape[2].direction, rounded_qtys[2]),
    ];

    Some(Deal::new(cycle.id.clone(), rounded_x0, rounded_profit, timestamp, actions))
}
