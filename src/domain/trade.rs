//! Trade request and result entities exchanged with HTTP callers.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::{OrderSide, PositionSide};

/// Keys every trade request must carry, in the order they are reported when missing.
pub const REQUIRED_TRADE_FIELDS: [&str; 8] = [
    "symbol",
    "type",
    "side",
    "qty",
    "leverage",
    "order_mode",
    "take_profit_percent",
    "stop_loss_percent",
];

/// OrderMode selects which exit orders accompany a trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderMode {
    /// Place both stop-loss and take-profit legs.
    Both,
    /// Any other mode. Accepted but places no exit orders.
    Other(String),
}

impl From<String> for OrderMode {
    fn from(mode: String) -> Self {
        if mode == "Both" {
            OrderMode::Both
        } else {
            OrderMode::Other(mode)
        }
    }
}

impl<'de> Deserialize<'de> for OrderMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(OrderMode::from)
    }
}

/// TradeRequest is a validated instruction to bracket a futures position.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TradeRequest {
    /// Symbol as sent by the caller ("BTC/USDT", "BTC/USDT:USDT" or "BTCUSDT").
    pub symbol: String,
    /// Entry order type as sent by the caller. Informational.
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: OrderSide,
    #[serde(rename = "qty")]
    pub quantity: Decimal,
    #[serde(deserialize_with = "deserialize_leverage")]
    pub leverage: u32,
    pub order_mode: OrderMode,
    pub take_profit_percent: Decimal,
    pub stop_loss_percent: Decimal,
}

impl TradeRequest {
    /// Direction of the position this request opens.
    pub fn position_side(&self) -> PositionSide {
        PositionSide::from(self.side)
    }

    /// Checks the value invariants serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.symbol.trim().is_empty() {
            return Err("symbol must not be empty".into());
        }
        if self.quantity <= Decimal::ZERO {
            return Err("qty must be positive".into());
        }
        if self.leverage == 0 {
            return Err("leverage must be positive".into());
        }
        if self.take_profit_percent.is_sign_negative() {
            return Err("take_profit_percent must not be negative".into());
        }
        if self.stop_loss_percent.is_sign_negative() {
            return Err("stop_loss_percent must not be negative".into());
        }
        Ok(())
    }
}

/// Accepts leverage as a JSON number or a numeric string.
fn deserialize_leverage<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u32),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid leverage: {}", s))),
    }
}

/// ResultStatus is the outcome flag carried by every result body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Error,
}

/// OrderResult is the outcome of placing one bracket leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResult {
    pub status: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OrderResult {
    pub fn success(order_id: impl Into<String>, client_order_id: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Success,
            order_id: Some(order_id.into()),
            client_order_id: Some(client_order_id.into()),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Error,
            order_id: None,
            client_order_id: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }
}

/// TradeResult aggregates the outcome of a whole trade request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    pub status: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_market_order: Option<OrderResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit_order: Option<OrderResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TradeResult {
    /// Both legs placed.
    pub fn bracket(stop_market_order: OrderResult, take_profit_order: OrderResult) -> Self {
        Self {
            status: ResultStatus::Success,
            stop_market_order: Some(stop_market_order),
            take_profit_order: Some(take_profit_order),
            message: None,
        }
    }

    /// Success without exit orders.
    pub fn acknowledged(message: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Success,
            stop_market_order: None,
            take_profit_order: None,
            message: Some(message.into()),
        }
    }

    /// Single error result with no leg details.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Error,
            stop_market_order: None,
            take_profit_order: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }
}
