//! Scriptable in-memory exchange for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::config::ExchangeCredentials;
use crate::domain::{ConditionalOrder, Market, OrderStatus, PlacedOrder};
use crate::exchanges::{Exchange, ExchangeError, ExchangeFactory, Result};

/// A recorded gateway call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Market(String),
    Ticker(String),
    Leverage(String, u32),
    Place(ConditionalOrder),
    Status(String, String),
}

pub struct MockExchange {
    price: Decimal,
    tick_size: Option<Decimal>,
    ticker_delay: Option<Duration>,
    leverage_error: Mutex<Option<ExchangeError>>,
    market_error: Mutex<Option<ExchangeError>>,
    ticker_error: Mutex<Option<ExchangeError>>,
    place_results: Mutex<VecDeque<Result<PlacedOrder>>>,
    status: OrderStatus,
    calls: Mutex<Vec<Call>>,
}

impl MockExchange {
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            tick_size: None,
            ticker_delay: None,
            leverage_error: Mutex::new(None),
            market_error: Mutex::new(None),
            ticker_error: Mutex::new(None),
            place_results: Mutex::new(VecDeque::new()),
            status: OrderStatus::New,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_tick_size(mut self, tick: Decimal) -> Self {
        self.tick_size = Some(tick);
        self
    }

    pub fn with_ticker_delay(mut self, delay: Duration) -> Self {
        self.ticker_delay = Some(delay);
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn failing_leverage(self, err: ExchangeError) -> Self {
        *self.leverage_error.lock().unwrap() = Some(err);
        self
    }

    pub fn failing_market(self, err: ExchangeError) -> Self {
        *self.market_error.lock().unwrap() = Some(err);
        self
    }

    pub fn failing_ticker(self, err: ExchangeError) -> Self {
        *self.ticker_error.lock().unwrap() = Some(err);
        self
    }

    /// Scripts placement outcomes in call order. Unscripted placements succeed.
    pub fn with_place_results(self, results: Vec<Result<PlacedOrder>>) -> Self {
        *self.place_results.lock().unwrap() = results.into();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn placed_orders(&self) -> Vec<ConditionalOrder> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Place(order) => Some(order),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Exchange for MockExchange {
    async fn market(&self, symbol: &str) -> Result<Market> {
        self.record(Call::Market(symbol.to_string()));
        if let Some(err) = self.market_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(Market {
            symbol: symbol.to_string(),
            tick_size: self.tick_size,
            price_precision: None,
        })
    }

    async fn ticker_price(&self, symbol: &str) -> Result<Decimal> {
        self.record(Call::Ticker(symbol.to_string()));
        if let Some(delay) = self.ticker_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.ticker_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self.price)
    }

    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<u32> {
        self.record(Call::Leverage(symbol.to_string(), leverage));
        if let Some(err) = self.leverage_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(leverage)
    }

    async fn place_order(&self, order: &ConditionalOrder) -> Result<PlacedOrder> {
        self.record(Call::Place(order.clone()));
        let scripted = self.place_results.lock().unwrap().pop_front();
        let count = self.placed_orders().len();
        scripted.unwrap_or_else(|| {
            Ok(PlacedOrder {
                order_id: format!("{}", 1000 + count),
                client_order_id: order.client_order_id.to_string(),
                status: OrderStatus::New,
            })
        })
    }

    async fn order_status(&self, symbol: &str, order_id: &str) -> Result<OrderStatus> {
        self.record(Call::Status(symbol.to_string(), order_id.to_string()));
        if order_id == "missing" {
            return Err(ExchangeError::OrderNotFound(order_id.to_string()));
        }
        Ok(self.status)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Factory handing out one shared mock and remembering the credentials it saw.
pub struct MockFactory {
    pub exchange: Arc<MockExchange>,
    pub seen: Mutex<Vec<ExchangeCredentials>>,
}

impl MockFactory {
    pub fn new(exchange: MockExchange) -> Self {
        Self {
            exchange: Arc::new(exchange),
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl ExchangeFactory for MockFactory {
    fn create(&self, credentials: &ExchangeCredentials) -> Result<Arc<dyn Exchange>> {
        self.seen.lock().unwrap().push(credentials.clone());
        let exchange: Arc<dyn Exchange> = self.exchange.clone();
        Ok(exchange)
    }
}
