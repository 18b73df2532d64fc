//! Exchange integration abstractions and implementations.

pub mod binance;
mod utils;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ExchangeCredentials;
use crate::domain::{ConditionalOrder, Market, OrderStatus, PlacedOrder};
use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

/// Exchange errors.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Symbol is not listed on this exchange.
    #[error("symbol {0} is not supported")]
    SymbolNotSupported(String),

    /// Not enough margin to place the order.
    #[error("insufficient margin: {0}")]
    InsufficientMargin(String),

    /// Order not found.
    #[error("order {0} not found")]
    OrderNotFound(String),

    /// Credentials were rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Request weight or order rate limit hit.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The exchange did not answer in time.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// API error from the exchange.
    #[error("API error: {0}")]
    Api(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for exchange operations.
pub type Result<T> = std::result::Result<T, ExchangeError>;

/// Exchange is the authenticated trading gateway the bracket engine drives.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Market returns the trading rules for a symbol.
    /// Returns SymbolNotSupported if the symbol is not listed.
    async fn market(&self, symbol: &str) -> Result<Market>;

    /// TickerPrice returns the last traded price for a symbol.
    async fn ticker_price(&self, symbol: &str) -> Result<Decimal>;

    /// SetLeverage changes the initial leverage for a symbol.
    /// Returns the leverage the exchange applied.
    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<u32>;

    /// PlaceOrder submits a conditional order and returns the exchange acknowledgement.
    async fn place_order(&self, order: &ConditionalOrder) -> Result<PlacedOrder>;

    /// OrderStatus retrieves the current state of an order by its exchange ID.
    /// Returns OrderNotFound if the order doesn't exist.
    async fn order_status(&self, symbol: &str, order_id: &str) -> Result<OrderStatus>;

    /// Name returns the unique identifier of this exchange.
    fn name(&self) -> &str;
}

/// ExchangeFactory builds a fresh gateway handle for one request.
pub trait ExchangeFactory: Send + Sync {
    fn create(&self, credentials: &ExchangeCredentials) -> Result<Arc<dyn Exchange>>;
}

/// Bounds an exchange call. Expiry becomes ExchangeError::Timeout.
pub async fn with_timeout<T, F>(limit: Duration, operation: &str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ExchangeError::Timeout(format!(
            "{} exceeded {:?}",
            operation, limit
        ))),
    }
}

#[cfg(test)]
pub mod mock;
