//! Bracket engine error types.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::exchanges::ExchangeError;

/// Client order id generation error.
#[derive(Debug, Error)]
pub enum IdError {
    #[error("invalid client order id prefix: {0}")]
    InvalidPrefix(String),
    #[error("entropy source unavailable: {0}")]
    Entropy(String),
}

/// Bracket price computation error.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    #[error("entry price must be positive, got {0}")]
    NonPositiveEntry(Decimal),
    #[error("{leg} price would be {price}, must be positive")]
    NonPositivePrice { leg: &'static str, price: Decimal },
    #[error("{leg} price is out of range for the given percentage")]
    Overflow { leg: &'static str },
}

/// Failure that aborts a trade before any exit order is placed.
#[derive(Debug, Error)]
pub enum TradeError {
    #[error("set leverage: {0}")]
    Leverage(#[source] ExchangeError),
    #[error("load market: {0}")]
    Market(#[source] ExchangeError),
    #[error("fetch price: {0}")]
    Price(#[source] ExchangeError),
    #[error("compute bracket: {0}")]
    Pricing(#[from] PricingError),
}

impl TradeError {
    /// Underlying exchange error, if the abort came from the exchange.
    pub fn exchange_error(&self) -> Option<&ExchangeError> {
        match self {
            TradeError::Leverage(e) | TradeError::Market(e) | TradeError::Price(e) => Some(e),
            TradeError::Pricing(_) => None,
        }
    }
}
