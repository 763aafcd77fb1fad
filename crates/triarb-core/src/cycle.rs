use std::fmt;

use serde::{Deserialize, Serialize};

use crate::asset::Asset;
use crate::trading_pair::TradingPair;

/// Which side of an order book a leg consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookSide {
    /// The sell side of the book (you pay these to buy).
    Asks,
    /// The buy side of the book (you receive these by selling).
    Bids,
}

/// The trade intent of a leg, independent of which book side it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDirection {
    Buy,
    Sell,
}

/// One step of a cycle's fixed execution plan: which symbol, which side of
/// its book to walk, and whether that amounts to a buy or a sell of the
/// base asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTapeEntry {
    pub symbol: String,
    pub side: BookSide,
    pub direction: TradeDirection,
}

/// Unique, deterministic identifier for a registered `Cycle`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CycleId(pub String);

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable, ordered triple of trading pairs that starts and ends in
/// `base`, plus the three-step action tape derived from walking
/// `base -> start.other -> middle.other -> base`.
///
/// Fixed for the cycle's lifetime: `Topology` builds all cycles once at
/// startup and nothing afterwards mutates one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cycle {
    pub id: CycleId,
    pub base: Asset,
    pub start: TradingPair,
    pub middle: TradingPair,
    pub end: TradingPair,
    pub action_tape: [ActionTapeEntry; 3],
}

impl Cycle {
    /// Build a cycle and derive its action tape from the walk
    /// `base -> start.other(base) -> middle.other(intermediate) -> base`.
    ///
    /// Returns `None` if the three pairs don't actually form a closed walk
    /// starting and ending in `base` (a programming error against the
    /// caller's topology search, never expected from `Topology` itself).
    pub fn new(base: Asset, start: TradingPair, middle: TradingPair, end: TradingPair) -> Option<Self> {
        let mut tape = Vec::with_capacity(3);
        let mut current = base.clone();

        for pair in [&start, &middle, &end] {
            let next = pair.other(&current)?;
            let (side, direction) = if current == pair.base {
                (BookSide::Bids, TradeDirection::Sell)
            } else {
                (BookSide::Asks, TradeDirection::Buy)
            };
            tape.push(ActionTapeEntry {
                symbol: pair.symbol.clone(),
                side,
                direction,
            });
            current = next;
        }

        if current != base {
            return None;
        }

        let id = CycleId(format!(
            "{}:{}:{}:{}",
            base, start.symbol, middle.symbol, end.symbol
        ));

        let action_tape: [ActionTapeEntry; 3] = tape.try_into().ok()?;

        Some(Self {
            id,
            base,
            start,
            middle,
            end,
            action_tape,
        })
    }

    /// The three exchange symbols this cycle depends on, in leg order.
    pub fn symbols(&self) -> [&str; 3] {
        [
            self.action_tape[0].symbol.as_str(),
            self.action_tape[1].symbol.as_str(),
            self.action_tape[2].symbol.as_str(),
        ]
    }

    /// A human-readable description, e.g. `"USDT -> BTC -> ETH -> USDT"`.
    pub fn text(&self) -> String {
        let mut asset = self.base.clone();
        let mut hops = vec![asset.to_string()];
        for pair in [&self.start, &self.middle, &self.end] {
            asset = pair.other(&asset).expect("cycle was validated at construction");
            hops.push(asset.to_string());
        }
        hops.join(" -> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn pair(symbol: &str, base: &str, quote: &str) -> TradingPair {
        TradingPair::new(symbol, base, quote, 8, 2, Decimal::new(1, 5))
    }

    #[test]
    fn action_tape_matches_expected_walk() {
        // USDT -> BTC -> ETH -> USDT
        let start = pair("BTCUSDT", "BTC", "USDT");
        let middle = pair("ETHBTC", "ETH", "BTC");
        let end = pair("ETHUSDT", "ETH", "USDT");

        let cycle = Cycle::new(Asset::from("USDT"), start, middle, end).unwrap();

        // leg 0: hold USDT, BTCUSDT.base = BTC != USDT -> BUY on asks
        assert_eq!(cycle.action_tape[0].direction, TradeDirection::Buy);
        assert_eq!(cycle.action_tape[0].side, BookSide::Asks);
        // leg 1: hold BTC, ETHBTC.base = ETH != BTC -> BUY on asks
        assert_eq!(cycle.action_tape[1].direction, TradeDirection::Buy);
        assert_eq!(cycle.action_tape[1].side, BookSide::Asks);
        // leg 2: hold ETH, ETHUSDT.base = ETH -> SELL on bids
        assert_eq!(cycle.action_tape[2].direction, TradeDirection::Sell);
        assert_eq!(cycle.action_tape[2].side, BookSide::Bids);
        assert_eq!(cycle.text(), "USDT -> BTC -> ETH -> USDT");
    }

    #[test]
    fn rejects_non_closed_walk() {
        let start = pair("BTCUSDT", "BTC", "USDT");
        let middle = pair("ETHBTC", "ETH", "BTC");
        let end = pair("BNBUSDT", "BNB", "USDT");
        assert!(Cycle::new(Asset::from("USDT"), start, middle, end).is_none());
    }
}
