//! Request handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use super::{ApiError, AppState, redact};
use crate::bracket::TradeOrchestrator;
use crate::config::ExchangeCredentials;
use crate::domain::{OrderStatus, REQUIRED_TRADE_FIELDS, ResultStatus, TradeRequest, TradeResult};
use crate::exchanges::with_timeout;

pub const CONFIG_UPDATED: &str = "Config updated successfully";
pub const CREDENTIALS_REQUIRED: &str = "API key and secret are required";

/// Body of `POST /update-config`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigRequest {
    #[serde(default)]
    api_key: String,
    #[serde(default)]
    api_secret: String,
    #[serde(default)]
    testnet: bool,
}

/// Body of a successful `GET /order-status`.
#[derive(Debug, Serialize)]
pub struct OrderStatusResponse {
    pub status: ResultStatus,
    pub order_id: String,
    pub order_status: OrderStatus,
}

/// Stores new exchange credentials.
pub async fn update_config(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TradeResult>, ApiError> {
    let Json(body) = payload.map_err(|r| ApiError::validation(r.body_text()))?;
    let request: UpdateConfigRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::validation(format!("Invalid parameters: {}", e)))?;

    if request.api_key.trim().is_empty() || request.api_secret.trim().is_empty() {
        return Err(ApiError::validation(CREDENTIALS_REQUIRED));
    }

    let credentials = ExchangeCredentials {
        api_key: request.api_key,
        api_secret: request.api_secret,
        testnet: request.testnet,
    };

    state.store.update(&credentials).await.map_err(|e| {
        error!(error = %e, "failed to store credentials");
        ApiError::from(e)
    })?;

    Ok(Json(TradeResult::acknowledged(CONFIG_UPDATED)))
}

/// Sets leverage and places the stop-loss / take-profit pair.
pub async fn execute_trade(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload.map_err(|r| ApiError::validation(r.body_text()))?;

    let missing = missing_fields(&body);
    if !missing.is_empty() {
        warn!(missing = ?missing, "trade request rejected");
        return Err(ApiError::validation(format!(
            "Missing parameters: {}",
            missing.join(", ")
        )));
    }

    let request: TradeRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::validation(format!("Invalid parameters: {}", e)))?;
    request.validate().map_err(ApiError::validation)?;

    let credentials = state.store.load().await.map_err(|e| {
        error!(error = %e, "failed to load credentials");
        ApiError::from(e)
    })?;
    let secrets = [credentials.api_key.as_str(), credentials.api_secret.as_str()];

    let gateway = state
        .factory
        .create(&credentials)
        .map_err(|e| ApiError::from(e).redact(&secrets))?;

    info!(
        exchange = gateway.name(),
        symbol = %request.symbol,
        side = request.side.as_str(),
        qty = %request.quantity,
        leverage = request.leverage,
        "executing trade"
    );

    let orchestrator = TradeOrchestrator::new(gateway, Arc::clone(&state.ids), state.settings);

    match orchestrator.execute(&request).await {
        Ok(mut result) => {
            redact_result(&mut result, &secrets);
            let status = if result.is_success() {
                StatusCode::OK
            } else {
                StatusCode::BAD_GATEWAY
            };
            Ok((status, Json(result)).into_response())
        }
        Err(e) => {
            let err = ApiError::from(e).redact(&secrets);
            error!(symbol = %request.symbol, status = %err.status(), error = %err.message(), "trade aborted");
            Err(err)
        }
    }
}

/// Reports the exchange state of a previously placed order.
pub async fn order_status(
    State(state): State<AppState>,
    Path((symbol, order_id)): Path<(String, String)>,
) -> Result<Json<OrderStatusResponse>, ApiError> {
    let credentials = state.store.load().await?;
    let secrets = [credentials.api_key.as_str(), credentials.api_secret.as_str()];

    let gateway = state
        .factory
        .create(&credentials)
        .map_err(|e| ApiError::from(e).redact(&secrets))?;

    let order_status = with_timeout(
        state.settings.call_timeout,
        "order status",
        gateway.order_status(&symbol, &order_id),
    )
    .await
    .map_err(|e| ApiError::from(e).redact(&secrets))?;

    Ok(Json(OrderStatusResponse {
        status: ResultStatus::Success,
        order_id,
        order_status,
    }))
}

/// Required keys absent from the body, in reporting order.
/// Keys present with a null value are left to deserialization to reject.
fn missing_fields(body: &Value) -> Vec<&'static str> {
    REQUIRED_TRADE_FIELDS
        .iter()
        .copied()
        .filter(|field| body.get(field).is_none())
        .collect()
}

fn redact_result(result: &mut TradeResult, secrets: &[&str]) {
    let messages = [
        result.message.as_mut(),
        result.stop_market_order.as_mut().and_then(|o| o.message.as_mut()),
        result.take_profit_order.as_mut().and_then(|o| o.message.as_mut()),
    ];
    for message in messages.into_iter().flatten() {
        *message = redact(message, secrets);
    }
}
