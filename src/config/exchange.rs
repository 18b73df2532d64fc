//! Exchange configuration.

use serde::Deserialize;
use std::time::Duration;

use super::duration;
use crate::exchanges::binance::{BASE_HTTP_API_URL, TESTNET_HTTP_API_URL};

/// Settings for the futures exchange connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Live API endpoint.
    pub base_url: String,
    /// Endpoint used when the stored credentials are flagged as testnet.
    pub testnet_base_url: String,
    /// Receive window for signed requests, in milliseconds.
    pub recv_window: u64,
    /// Upper bound for any single exchange call.
    #[serde(with = "duration")]
    pub request_timeout: Duration,
    /// Fixed prefix of every generated client order id.
    pub client_order_prefix: String,
    /// Price decimals used when the exchange reports neither tick size nor precision.
    pub default_price_precision: u32,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_HTTP_API_URL.to_string(),
            testnet_base_url: TESTNET_HTTP_API_URL.to_string(),
            recv_window: 5000,
            request_timeout: Duration::from_secs(10),
            client_order_prefix: "x-40PTWbMI".to_string(),
            default_price_precision: 2,
        }
    }
}
