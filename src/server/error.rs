//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::bracket::TradeError;
use crate::config::CredentialError;
use crate::domain::TradeResult;
use crate::exchanges::ExchangeError;

const SIGNATURE_PARAM: &str = "signature=";
const MASK: &str = "***";

/// Error returned by a handler, rendered as `{"status":"error","message":...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Caller sent a request that cannot be executed.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Masks every occurrence of the given secrets in the message.
    pub fn redact(mut self, secrets: &[&str]) -> Self {
        self.message = redact(&self.message, secrets);
        self
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<ExchangeError> for ApiError {
    fn from(err: ExchangeError) -> Self {
        Self {
            status: exchange_status(&err),
            message: err.to_string(),
        }
    }
}

impl From<TradeError> for ApiError {
    fn from(err: TradeError) -> Self {
        let status = match err.exchange_error() {
            Some(e) => exchange_status(e),
            None => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

fn exchange_status(err: &ExchangeError) -> StatusCode {
    match err {
        ExchangeError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        ExchangeError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        ExchangeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = TradeResult::error(strip_signature(&self.message));
        (self.status, Json(body)).into_response()
    }
}

/// Replaces secrets with `***` and drops signature values.
pub fn redact(message: &str, secrets: &[&str]) -> String {
    let masked = secrets
        .iter()
        .filter(|s| !s.is_empty())
        .fold(message.to_string(), |acc, secret| acc.replace(secret, MASK));
    strip_signature(&masked)
}

fn strip_signature(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut rest = message;

    while let Some(pos) = rest.find(SIGNATURE_PARAM) {
        out.push_str(&rest[..pos + SIGNATURE_PARAM.len()]);
        out.push_str(MASK);
        let value = &rest[pos + SIGNATURE_PARAM.len()..];
        let end = value
            .find(|c: char| c == '&' || c == '"' || c == ')' || c.is_whitespace())
            .unwrap_or(value.len());
        rest = &value[end..];
    }

    out.push_str(rest);
    out
}
