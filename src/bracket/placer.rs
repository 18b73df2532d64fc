//! Single conditional order placement.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{error, info};

use super::ClientOrderIdGenerator;
use crate::domain::{
    ConditionalKind, ConditionalOrder, OrderResult, PositionSide, TimeInForce,
};
use crate::exchanges::{Exchange, with_timeout};

/// Message reported when no client order id could be produced.
pub const ID_GENERATION_FAILED: &str = "Failed to generate client order ID";

/// Places close-position trigger orders for one gateway.
pub struct OrderPlacer {
    gateway: Arc<dyn Exchange>,
    ids: Arc<ClientOrderIdGenerator>,
    call_timeout: Duration,
}

impl OrderPlacer {
    pub fn new(
        gateway: Arc<dyn Exchange>,
        ids: Arc<ClientOrderIdGenerator>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            ids,
            call_timeout,
        }
    }

    /// Places one bracket leg. Failures are captured in the returned result.
    ///
    /// The order carries `closePosition`, so the exchange closes whatever is
    /// open; `quantity` is only logged.
    pub async fn place_conditional(
        &self,
        kind: ConditionalKind,
        symbol: &str,
        quantity: Decimal,
        trigger_price: Decimal,
        position_side: PositionSide,
    ) -> OrderResult {
        let client_order_id = match self.ids.generate() {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, kind = kind.label(), "client order id generation failed");
                return OrderResult::error(ID_GENERATION_FAILED);
            }
        };

        let order = ConditionalOrder {
            symbol: symbol.to_string(),
            side: position_side.closing_side(),
            order_type: kind.order_type(),
            stop_price: trigger_price,
            close_position: true,
            time_in_force: TimeInForce::GoodTillCancel,
            client_order_id,
        };

        let placed = with_timeout(
            self.call_timeout,
            order.order_type.as_str(),
            self.gateway.place_order(&order),
        )
        .await;

        match placed {
            Ok(placed) => {
                info!(
                    symbol = %symbol,
                    order_type = order.order_type.as_str(),
                    side = order.side.as_str(),
                    trigger_price = %trigger_price,
                    quantity = %quantity,
                    order_id = %placed.order_id,
                    client_order_id = %order.client_order_id,
                    "conditional order placed"
                );
                OrderResult::success(placed.order_id, order.client_order_id.to_string())
            }
            Err(e) => {
                error!(
                    symbol = %symbol,
                    order_type = order.order_type.as_str(),
                    trigger_price = %trigger_price,
                    client_order_id = %order.client_order_id,
                    error = %e,
                    "conditional order failed"
                );
                OrderResult::error(e.to_string())
            }
        }
    }
}
