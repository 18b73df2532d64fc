//! Core business entities for conditional exit orders.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// OrderSide represents the direction of an order (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    /// Buy side. Opening a trade with this side produces a long position.
    #[serde(alias = "buy", alias = "BUY")]
    Buy,
    /// Sell side. Opening a trade with this side produces a short position.
    #[serde(alias = "sell", alias = "SELL")]
    Sell,
}

impl OrderSide {
    /// Wire representation used by the exchange API.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

/// PositionSide is the direction of the open position a bracket protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// Side of the order that closes this position.
    pub fn closing_side(&self) -> OrderSide {
        match self {
            PositionSide::Long => OrderSide::Sell,
            PositionSide::Short => OrderSide::Buy,
        }
    }
}

impl From<OrderSide> for PositionSide {
    fn from(side: OrderSide) -> Self {
        match side {
            OrderSide::Buy => PositionSide::Long,
            OrderSide::Sell => PositionSide::Short,
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
        }
    }
}

/// ConditionalKind selects which leg of a bracket an order belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionalKind {
    StopLoss,
    TakeProfit,
}

impl ConditionalKind {
    /// Exchange order type for this leg.
    pub fn order_type(&self) -> OrderType {
        match self {
            ConditionalKind::StopLoss => OrderType::StopMarket,
            ConditionalKind::TakeProfit => OrderType::TakeProfitMarket,
        }
    }

    /// Human readable label used in aggregated error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ConditionalKind::StopLoss => "Stop Market",
            ConditionalKind::TakeProfit => "Take Profit",
        }
    }
}

/// OrderType represents the conditional order types the service places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Market order triggered when the stop price is crossed against the position.
    StopMarket,
    /// Market order triggered when the stop price is crossed in favour of the position.
    TakeProfitMarket,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::StopMarket => "STOP_MARKET",
            OrderType::TakeProfitMarket => "TAKE_PROFIT_MARKET",
        }
    }
}

/// TimeInForce for conditional orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good till cancelled.
    #[serde(rename = "GTC")]
    GoodTillCancel,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::GoodTillCancel => "GTC",
        }
    }
}

/// OrderStatus represents the exchange-reported state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Cancelled,
    Expired,
    Rejected,
    Unknown,
}

/// ClientOrderId is the caller-assigned identifier attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientOrderId(String);

impl ClientOrderId {
    /// Maximum identifier length the exchange accepts.
    pub const MAX_LEN: usize = 36;

    /// Returns true if every character is in the exchange charset `[.A-Z:/a-z0-9_-]`.
    pub fn is_valid_charset(s: &str) -> bool {
        s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | ':' | '/' | '_' | '-'))
    }

    /// Wraps an already validated identifier.
    pub(crate) fn new(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ConditionalOrder is a close-position trigger order ready to be submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalOrder {
    /// Exchange symbol (e.g., "BTCUSDT").
    pub symbol: String,
    /// Closing side of the order.
    pub side: OrderSide,
    pub order_type: OrderType,
    /// Trigger price.
    pub stop_price: Decimal,
    /// When true the order closes the entire open position.
    pub close_position: bool,
    pub time_in_force: TimeInForce,
    pub client_order_id: ClientOrderId,
}

/// PlacedOrder is the exchange acknowledgement of a submitted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedOrder {
    /// Identifier assigned by the exchange.
    pub order_id: String,
    pub client_order_id: String,
    pub status: OrderStatus,
}
