//! Common utilities for exchange implementations.

use crate::domain::OrderStatus;

/// Converts "BTC/USDT", "BTC/USDT:USDT" or "btcusdt" to "BTCUSDT".
pub fn normalize_symbol(symbol: &str) -> String {
    let unified = symbol.split(':').next().unwrap_or(symbol);
    unified
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_uppercase()
}

/// Maps futures order states to OrderStatus.
pub fn parse_order_status(state: &str) -> OrderStatus {
    match state {
        "NEW" => OrderStatus::New,
        "PARTIALLY_FILLED" => OrderStatus::PartiallyFilled,
        "FILLED" => OrderStatus::Filled,
        "CANCELED" => OrderStatus::Cancelled,
        "EXPIRED" | "EXPIRED_IN_MATCH" => OrderStatus::Expired,
        "REJECTED" => OrderStatus::Rejected,
        _ => OrderStatus::Unknown,
    }
}
