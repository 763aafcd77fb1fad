use rust_decimal::Decimal;

/// One row of the exchange's symbol catalogue, as returned by
/// `exchange_info()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    pub symbol: String,
    pub status: String,
    pub base: String,
    pub quote: String,
    pub base_precision: u32,
    pub quote_precision: u32,
    /// `None` if the symbol's `LOT_SIZE` filter is absent, a fatal
    /// catalogue error for any symbol the engine actually needs.
    pub lot_step: Option<Decimal>,
}

impl SymbolInfo {
    pub fn is_trading(&self) -> bool {
        self.status == "TRADING"
    }
}

/// A raw depth update as delivered by `subscribe_depth`'s callback:
/// `[price, qty]` pairs as decimal strings, not yet parsed or sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDepth {
    pub asks: Vec<(String, String)>,
    pub bids: Vec<(String, String)>,
}

/// The result of placing a market order: just the exchange's assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderHandle {
    pub order_id: String,
}

/// Order lifecycle status as reported by `get_order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
    Expired,
}

impl OrderStatus {
    pub fn is_terminal_success(self) -> bool {
        matches!(self, OrderStatus::Filled)
    }

    pub fn is_terminal_failure(self) -> bool {
        matches!(self, OrderStatus::Canceled | OrderStatus::Rejected | OrderStatus::Expired)
    }
}
