//! Domain models for bracket trading.

mod market;
mod order;
mod trade;

pub use market::{Market, PricePrecision};
pub use order::{
    ClientOrderId, ConditionalKind, ConditionalOrder, OrderSide, OrderStatus, PlacedOrder,
    PositionSide, TimeInForce,
};
#[cfg(test)]
pub use order::OrderType;
pub use trade::{OrderMode, OrderResult, ResultStatus, TradeRequest, TradeResult, REQUIRED_TRADE_FIELDS};
