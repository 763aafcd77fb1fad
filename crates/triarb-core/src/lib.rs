//! Triarb Core Domain
//!
//! Pure domain types for the triangular arbitrage engine: assets, trading
//! pairs, order book snapshots, cycles and deals. No I/O, no concurrency,
//! everything here is 100% unit testable in isolation.

mod asset;
mod cycle;
mod deal;
mod order_book;
mod trading_pair;
mod values;

pub use asset::Asset;
pub use cycle::{ActionTapeEntry, BookSide, Cycle, CycleId, TradeDirection};
pub use deal::{Action, Deal};
pub use order_book::{BookLevel, OrderBook};
pub use trading_pair::TradingPair;
pub use values::{Price, Quantity, Timestamp};
