//! Binance USDⓈ-M futures integration.

mod client;
mod exchange;

pub use client::{BASE_HTTP_API_URL, TESTNET_HTTP_API_URL};
pub use exchange::BinanceFactory;

#[cfg(test)]
use client::{Client, ClientConfig};
#[cfg(test)]
use exchange::BinanceFutures;

#[cfg(test)]
mod tests;
