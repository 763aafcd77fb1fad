use std::hash::{Hash, Hasher};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::asset::Asset;
use crate::values::Quantity;

/// Immutable descriptor of an exchange symbol: its base/quote assets,
/// decimal precisions, and the minimum quantity increment (`step`) of the
/// base asset.
///
/// Built once at startup from the exchange's symbol catalogue and never
/// mutated afterwards.
///
/// Equality and hashing are defined over the *unordered set* `{base, quote}`,
/// not the symbol string: this lets `Topology` recognize a synthetic
/// `(a, b)` pair as "the same pair" as a cataloged `BA` symbol regardless of
/// which asset is base and which is quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingPair {
    pub symbol: String,
    pub base: Asset,
    pub quote: Asset,
    pub base_precision: u32,
    pub quote_precision: u32,
    /// Minimum quantity increment of the base asset (Binance `LOT_SIZE.stepSize`).
    pub step: Quantity,
}

impl TradingPair {
    pub fn new(
        symbol: impl Into<String>,
        base: impl Into<Asset>,
        quote: impl Into<Asset>,
        base_precision: u32,
        quote_precision: u32,
        step: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            base: base.into(),
            quote: quote.into(),
            base_precision,
            quote_precision,
            step,
        }
    }

    /// A pair synthesized from two assets with no exchange symbol of its
    /// own. Used by `Topology` to search the catalogue for the real pair
    /// that matches this unordered asset combination.
    pub fn synthetic(base: impl Into<Asset>, quote: impl Into<Asset>) -> Self {
        let base = base.into();
        let quote = quote.into();
        Self {
            symbol: format!("{base}{quote}"),
            base,
            quote,
            base_precision: 0,
            quote_precision: 0,
            step: Decimal::ZERO,
        }
    }

    pub fn has_asset(&self, asset: &Asset) -> bool {
        &self.base == asset || &self.quote == asset
    }

    /// The asset on the other side of this pair from `asset`, or `None` if
    /// this pair does not involve `asset` at all.
    pub fn other(&self, asset: &Asset) -> Option<Asset> {
        if &self.quote == asset {
            Some(self.base.clone())
        } else if &self.base == asset {
            Some(self.quote.clone())
        } else {
            None
        }
    }

    /// Round `qty` down to the nearest multiple of `step`.
    pub fn round_down(&self, qty: Quantity) -> Quantity {
        if self.step.is_zero() {
            return qty;
        }
        (qty / self.step).floor() * self.step
    }
}

impl PartialEq for TradingPair {
    fn eq(&self, other: &Self) -> bool {
        (self.base == other.base && self.quote == other.quote)
            || (self.base == other.quote && self.quote == other.base)
    }
}

impl Eq for TradingPair {}

impl Hash for TradingPair {
    /// Order-independent hash consistent with the order-independent `Eq`:
    /// combine the two assets' hashes with an associative, commutative `xor`
    /// so `{base, quote}` hashes equal regardless of who's listed first.
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut hash_one = |a: &Asset| {
            let mut h = std::collections::hash_map::DefaultHasher::new();
            a.hash(&mut h);
            h.finish()
        };
        let combined = hash_one(&self.base) ^ hash_one(&self.quote);
        combined.hash(state);
    }
}
