//! HTTP interface of the bracket service.
//!
//! Routes:
//! - `POST /update-config` stores exchange credentials
//! - `POST /execute-trade` sets leverage and places the exit bracket
//! - `GET /order-status/:symbol/:order_id` reads an order back from the exchange

mod error;
mod routes;

pub use error::{ApiError, redact};

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::bracket::{ClientOrderIdGenerator, OrchestratorSettings};
use crate::config::CredentialStore;
use crate::exchanges::ExchangeFactory;

/// Shared handler state. Gateways are built per request from fresh credentials.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CredentialStore>,
    pub factory: Arc<dyn ExchangeFactory>,
    pub ids: Arc<ClientOrderIdGenerator>,
    pub settings: OrchestratorSettings,
}

/// Builds the service router.
pub fn router(state: AppState, cors: bool) -> Router {
    let router = Router::new()
        .route("/update-config", post(routes::update_config))
        .route("/execute-trade", post(routes::execute_trade))
        .route("/order-status/:symbol/:order_id", get(routes::order_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
