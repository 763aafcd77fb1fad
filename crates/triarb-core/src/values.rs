use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Price of one unit of a trading pair's base asset, in quote asset terms.
pub type Price = Decimal;

/// Quantity of an asset, always non-negative.
pub type Quantity = Decimal;

/// Wall-clock instant. Always sourced from a `triarb_clock::Clock`, never
/// `Utc::now()` directly, so tests can control it.
pub type Timestamp = DateTime<Utc>;
