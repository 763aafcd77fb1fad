use rust_decimal::Decimal;

use triarb_core::TradeDirection;

use crate::error::Result;
use crate::model::{OrderHandle, OrderStatus, RawDepth, SymbolInfo};

/// The exchange REST/websocket collaborator contract. The concrete network
/// client is an external collaborator out of scope for this crate; this
/// trait is the seam `DepthIngest`'s socket layer and `Executor` are
/// written against, so the pipeline can be driven end-to-end in tests by
/// [`crate::SimulatedExchange`] without a real network dependency.
pub trait ExchangeClient: Send + Sync {
    /// The full symbol catalogue, one entry per tradeable pair.
    fn exchange_info(&self) -> Result<Vec<SymbolInfo>>;

    /// Subscribe to depth updates for `symbol` at the requested `depth`.
    /// `on_message` is invoked from some exchange-owned thread for every
    /// update; it must not block.
    fn subscribe_depth(
        &self,
        symbol: &str,
        depth: usize,
        on_message: Box<dyn Fn(RawDepth) + Send + Sync>,
    ) -> Result<()>;

    /// Place a market order for `qty` units of `symbol`'s base asset.
    fn market_order(&self, symbol: &str, direction: TradeDirection, qty: Decimal) -> Result<OrderHandle>;

    /// Poll an order's current status.
    fn get_order(&self, symbol: &str, order_id: &str) -> Result<OrderStatus>;

    /// Health-check.
    fn ping(&self) -> Result<()>;
}
