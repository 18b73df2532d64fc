//! Bracket order orchestration.
//!
//! Sets leverage, reads the market, prices the exit legs and places the
//! stop-loss and take-profit orders for one trade request.

mod client_id;
mod error;
mod placer;
mod pricing;

pub use client_id::ClientOrderIdGenerator;
pub use error::{IdError, PricingError, TradeError};
pub use placer::OrderPlacer;
pub use pricing::compute;

#[cfg(test)]
use client_id::EntropySource;
#[cfg(test)]
use placer::ID_GENERATION_FAILED;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::ExchangeConfig;
use crate::domain::{ConditionalKind, OrderMode, OrderResult, TradeRequest, TradeResult};
use crate::exchanges::{Exchange, with_timeout};

/// Acknowledgement returned for modes that place no exit orders.
pub const ACKNOWLEDGED: &str = "Trade executed successfully";

/// Orchestrator settings taken from the exchange config.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorSettings {
    /// Upper bound for each exchange call.
    pub call_timeout: Duration,
    /// Price decimals used when the market reports no precision.
    pub default_price_precision: u32,
}

impl From<&ExchangeConfig> for OrchestratorSettings {
    fn from(config: &ExchangeConfig) -> Self {
        Self {
            call_timeout: config.request_timeout,
            default_price_precision: config.default_price_precision,
        }
    }
}

/// Coordinates one trade request against one gateway.
pub struct TradeOrchestrator {
    gateway: Arc<dyn Exchange>,
    placer: OrderPlacer,
    settings: OrchestratorSettings,
}

impl TradeOrchestrator {
    pub fn new(
        gateway: Arc<dyn Exchange>,
        ids: Arc<ClientOrderIdGenerator>,
        settings: OrchestratorSettings,
    ) -> Self {
        let placer = OrderPlacer::new(Arc::clone(&gateway), ids, settings.call_timeout);
        Self {
            gateway,
            placer,
            settings,
        }
    }

    /// Executes a trade request.
    ///
    /// Leverage, market and price failures abort with `TradeError`. Once
    /// pricing succeeds both legs are always attempted, stop-loss first, and
    /// a failed leg turns the result into an error without cancelling the
    /// other leg.
    pub async fn execute(&self, request: &TradeRequest) -> Result<TradeResult, TradeError> {
        let symbol = request.symbol.as_str();
        let timeout = self.settings.call_timeout;

        info!(symbol = %symbol, leverage = request.leverage, "setting leverage");
        with_timeout(
            timeout,
            "set leverage",
            self.gateway.set_leverage(symbol, request.leverage),
        )
        .await
        .map_err(TradeError::Leverage)?;

        let position_side = request.position_side();

        if let OrderMode::Other(mode) = &request.order_mode {
            warn!(symbol = %symbol, mode = %mode, "order mode places no exit orders");
            return Ok(TradeResult::acknowledged(ACKNOWLEDGED));
        }

        let market = with_timeout(timeout, "load market", self.gateway.market(symbol))
            .await
            .map_err(TradeError::Market)?;
        let entry_price = with_timeout(timeout, "fetch price", self.gateway.ticker_price(symbol))
            .await
            .map_err(TradeError::Price)?;

        let prices = compute(
            entry_price,
            position_side,
            request.take_profit_percent,
            request.stop_loss_percent,
            market.precision(self.settings.default_price_precision),
        )?;

        info!(
            symbol = %symbol,
            position_side = %position_side,
            entry_price = %entry_price,
            take_profit_price = %prices.take_profit_price,
            stop_loss_price = %prices.stop_loss_price,
            "bracket priced"
        );

        let stop_market = self
            .placer
            .place_conditional(
                ConditionalKind::StopLoss,
                symbol,
                request.quantity,
                prices.stop_loss_price,
                position_side,
            )
            .await;
        let take_profit = self
            .placer
            .place_conditional(
                ConditionalKind::TakeProfit,
                symbol,
                request.quantity,
                prices.take_profit_price,
                position_side,
            )
            .await;

        Ok(merge_legs(stop_market, take_profit))
    }
}

/// Folds the two leg outcomes into one result. No compensation is attempted.
fn merge_legs(stop_market: OrderResult, take_profit: OrderResult) -> TradeResult {
    let failures: Vec<String> = [
        (ConditionalKind::StopLoss, &stop_market),
        (ConditionalKind::TakeProfit, &take_profit),
    ]
    .into_iter()
    .filter(|(_, leg)| !leg.is_success())
    .map(|(kind, leg)| {
        format!(
            "{} Error: {}",
            kind.label(),
            leg.message.as_deref().unwrap_or("unknown error")
        )
    })
    .collect();

    if failures.is_empty() {
        return TradeResult::bracket(stop_market, take_profit);
    }

    if failures.len() == 1 {
        let placed = if stop_market.is_success() {
            &stop_market
        } else {
            &take_profit
        };
        warn!(
            order_id = ?placed.order_id,
            "one bracket leg failed, the other remains live on the exchange"
        );
    }

    let mut result = TradeResult::error(failures.join("; "));
    result.stop_market_order = Some(stop_market);
    result.take_profit_order = Some(take_profit);
    result
}

impl From<TradeError> for TradeResult {
    fn from(err: TradeError) -> Self {
        TradeResult::error(err.to_string())
    }
}
