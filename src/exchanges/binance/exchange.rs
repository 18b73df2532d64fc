use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::{ExchangeConfig, ExchangeCredentials};
use crate::domain::{ConditionalOrder, Market, OrderStatus, PlacedOrder};
use crate::exchanges::binance::client::{Client, ClientError};
use crate::exchanges::utils::{normalize_symbol, parse_order_status};
use crate::exchanges::{Exchange, ExchangeError, ExchangeFactory, Result};

const EXCHANGE_NAME: &str = "binance-futures";

/// Binance USDⓈ-M futures implementation.
pub struct BinanceFutures {
    client: Client,
}

impl BinanceFutures {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a gateway from the exchange config and stored credentials.
    pub fn from_config(
        config: &ExchangeConfig,
        credentials: &ExchangeCredentials,
    ) -> Result<Self> {
        let client = Client::from_config(config, credentials)
            .map_err(|e| ExchangeError::Internal(format!("create binance client: {}", e)))?;

        debug!(
            base_url = %client.base_url(),
            testnet = credentials.testnet,
            "binance futures gateway created"
        );

        Ok(Self::new(client))
    }
}

#[async_trait]
impl Exchange for BinanceFutures {
    async fn market(&self, symbol: &str) -> Result<Market> {
        let id = normalize_symbol(symbol);

        let body = self
            .client
            .request(Method::GET, "/fapi/v1/exchangeInfo", None, false)
            .await
            .map_err(|e| map_client_error(e, &id))?;

        let info: ExchangeInfoResponse = serde_json::from_slice(&body)
            .map_err(|e| ExchangeError::Api(format!("parse exchange info: {}", e)))?;

        info.symbols
            .into_iter()
            .find(|s| s.symbol == id)
            .map(SymbolInfo::into_market)
            .ok_or(ExchangeError::SymbolNotSupported(id))
    }

    async fn ticker_price(&self, symbol: &str) -> Result<Decimal> {
        let id = normalize_symbol(symbol);

        let mut params = BTreeMap::new();
        params.insert("symbol".to_string(), id.clone());

        let body = self
            .client
            .request(Method::GET, "/fapi/v1/ticker/price", Some(params), false)
            .await
            .map_err(|e| map_client_error(e, &id))?;

        let ticker: TickerPriceResponse = serde_json::from_slice(&body)
            .map_err(|e| ExchangeError::Api(format!("parse ticker: {}", e)))?;

        Decimal::from_str(&ticker.price)
            .map_err(|e| ExchangeError::Api(format!("parse ticker price {}: {}", ticker.price, e)))
    }

    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<u32> {
        let id = normalize_symbol(symbol);

        let mut params = BTreeMap::new();
        params.insert("symbol".to_string(), id.clone());
        params.insert("leverage".to_string(), leverage.to_string());

        let body = self
            .client
            .request(Method::POST, "/fapi/v1/leverage", Some(params), true)
            .await
            .map_err(|e| map_client_error(e, &id))?;

        let resp: LeverageResponse = serde_json::from_slice(&body)
            .map_err(|e| ExchangeError::Api(format!("parse leverage response: {}", e)))?;

        info!(symbol = %id, leverage = resp.leverage, "leverage set");

        Ok(resp.leverage)
    }

    async fn place_order(&self, order: &ConditionalOrder) -> Result<PlacedOrder> {
        let id = normalize_symbol(&order.symbol);

        let mut params = BTreeMap::new();
        params.insert("symbol".to_string(), id.clone());
        params.insert("side".to_string(), order.side.as_str().to_string());
        params.insert("type".to_string(), order.order_type.as_str().to_string());
        params.insert("stopPrice".to_string(), order.stop_price.to_string());
        params.insert("closePosition".to_string(), order.close_position.to_string());
        params.insert(
            "timeInForce".to_string(),
            order.time_in_force.as_str().to_string(),
        );
        params.insert(
            "newClientOrderId".to_string(),
            order.client_order_id.to_string(),
        );

        let body = self
            .client
            .request(Method::POST, "/fapi/v1/order", Some(params), true)
            .await
            .map_err(|e| map_client_error(e, &id))?;

        let resp: OrderResponse = serde_json::from_slice(&body)
            .map_err(|e| ExchangeError::Api(format!("parse order response: {}", e)))?;

        Ok(PlacedOrder {
            order_id: resp.order_id.to_string(),
            client_order_id: resp.client_order_id,
            status: parse_order_status(&resp.status),
        })
    }

    async fn order_status(&self, symbol: &str, order_id: &str) -> Result<OrderStatus> {
        let id = normalize_symbol(symbol);

        let mut params = BTreeMap::new();
        params.insert("symbol".to_string(), id.clone());
        params.insert("orderId".to_string(), order_id.to_string());

        let body = self
            .client
            .request(Method::GET, "/fapi/v1/order", Some(params), true)
            .await
            .map_err(|e| map_client_error(e, order_id))?;

        let resp: OrderResponse = serde_json::from_slice(&body)
            .map_err(|e| ExchangeError::Api(format!("parse order: {}", e)))?;

        Ok(parse_order_status(&resp.status))
    }

    fn name(&self) -> &str {
        EXCHANGE_NAME
    }
}

/// Builds a fresh Binance futures gateway per call.
pub struct BinanceFactory {
    config: ExchangeConfig,
}

impl BinanceFactory {
    pub fn new(config: ExchangeConfig) -> Self {
        Self { config }
    }
}

impl ExchangeFactory for BinanceFactory {
    fn create(&self, credentials: &ExchangeCredentials) -> Result<Arc<dyn Exchange>> {
        Ok(Arc::new(BinanceFutures::from_config(&self.config, credentials)?))
    }
}

/// Futures exchange info response.
#[derive(Debug, Deserialize)]
struct ExchangeInfoResponse {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    symbol: String,
    price_precision: Option<u32>,
    #[serde(default)]
    filters: Vec<SymbolFilter>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "filterType")]
enum SymbolFilter {
    #[serde(rename = "PRICE_FILTER", rename_all = "camelCase")]
    Price { tick_size: String },
    #[serde(other)]
    Other,
}

impl SymbolInfo {
    fn into_market(self) -> Market {
        let tick_size = self.filters.iter().find_map(|f| match f {
            SymbolFilter::Price { tick_size } => Decimal::from_str(tick_size).ok(),
            SymbolFilter::Other => None,
        });

        Market {
            symbol: self.symbol,
            tick_size,
            price_precision: self.price_precision,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TickerPriceResponse {
    price: String,
}

#[derive(Debug, Deserialize)]
struct LeverageResponse {
    leverage: u32,
}

/// Futures order response, shared by placement and query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
    order_id: i64,
    #[serde(default)]
    client_order_id: String,
    status: String,
}

/// Maps Binance client errors to exchange errors.
fn map_client_error(err: ClientError, subject: &str) -> ExchangeError {
    match err {
        ClientError::Api(api_err) => match (api_err.code, api_err.status) {
            (-1121, _) => ExchangeError::SymbolNotSupported(subject.to_string()),
            (-2019, _) => ExchangeError::InsufficientMargin(api_err.message),
            (-2013, _) => ExchangeError::OrderNotFound(subject.to_string()),
            (-2014 | -2015 | -1022, _) | (_, 401) => ExchangeError::Auth(api_err.message),
            (-1003 | -1015, _) | (_, 418 | 429) => ExchangeError::RateLimited(api_err.message),
            _ => ExchangeError::Api(format!("binance error for {}: {}", subject, api_err)),
        },
        ClientError::Request(e) if e.is_timeout() => {
            ExchangeError::Timeout(format!("binance request for {}", subject))
        }
        ClientError::Request(e) => ExchangeError::Connection(format!("{}", e.without_url())),
        other => ExchangeError::Api(format!("{}", other)),
    }
}
