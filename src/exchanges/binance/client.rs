//! HTTP client for the Binance USDⓈ-M Futures API.

use std::collections::BTreeMap;
use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ExchangeConfig, ExchangeCredentials};

/// Default receive window for signed requests in milliseconds.
const DEFAULT_RECEIVE_WINDOW: u64 = 5000;

/// Production futures HTTP API endpoint.
pub const BASE_HTTP_API_URL: &str = "https://fapi.binance.com";

/// Futures testnet HTTP API endpoint.
pub const TESTNET_HTTP_API_URL: &str = "https://testnet.binancefuture.com";

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the API key on signed requests.
const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Binance API error.
#[derive(Debug, Error)]
#[error("binance api error {code}: {message}")]
pub struct ApiError {
    pub code: i32,
    pub message: String,
    pub status: u16,
}

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid client setup: {0}")]
    Setup(String),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Configuration for creating a new Client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub receive_window: u64,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            base_url: BASE_HTTP_API_URL.to_string(),
            api_key,
            api_secret,
            receive_window: DEFAULT_RECEIVE_WINDOW,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_receive_window(mut self, receive_window: u64) -> Self {
        if receive_window > 0 {
            self.receive_window = receive_window;
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.timeout = timeout;
        }
        self
    }
}

/// HTTP client for the Binance futures API.
/// Handles request signing and error decoding.
pub struct Client {
    config: ClientConfig,
    http_client: HttpClient,
}

impl Client {
    /// Creates a new Binance futures API client.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Setup(format!("build http client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Creates a client from the exchange config and stored credentials.
    /// Testnet credentials select the testnet endpoint.
    pub fn from_config(
        exchange_config: &ExchangeConfig,
        credentials: &ExchangeCredentials,
    ) -> Result<Self> {
        let base_url = if credentials.testnet {
            &exchange_config.testnet_base_url
        } else {
            &exchange_config.base_url
        };

        let config = ClientConfig::new(
            credentials.api_key.clone(),
            credentials.api_secret.clone(),
        )
        .with_base_url(base_url.as_str())
        .with_receive_window(exchange_config.recv_window)
        .with_timeout(exchange_config.request_timeout);

        Self::new(config)
    }

    /// Creates an HMAC-SHA256 signature of the query string, hex encoded.
    pub(super) fn sign(&self, payload: &str) -> Result<String> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.config.api_secret.as_bytes())
            .map_err(|e| ClientError::Setup(format!("hmac key: {}", e)))?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Builds the query string. Signed requests get timestamp, recvWindow and signature.
    fn build_query(&self, params: BTreeMap<String, String>, signed: bool) -> Result<String> {
        let mut params = params;
        if signed {
            let timestamp = chrono::Utc::now().timestamp_millis();
            params.insert("timestamp".to_string(), timestamp.to_string());
            params.insert(
                "recvWindow".to_string(),
                self.config.receive_window.to_string(),
            );
        }

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        if !signed {
            return Ok(query);
        }

        let signature = self.sign(&query)?;
        Ok(format!("{}&signature={}", query, signature))
    }

    /// Sends an HTTP request to the futures API.
    /// Parameters always travel in the query string; the body stays empty.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        params: Option<BTreeMap<String, String>>,
        signed: bool,
    ) -> Result<Vec<u8>> {
        let query = self.build_query(params.unwrap_or_default(), signed)?;

        let url = if query.is_empty() {
            format!("{}{}", self.config.base_url, endpoint)
        } else {
            format!("{}{}?{}", self.config.base_url, endpoint, query)
        };

        let mut request = self.http_client.request(method.clone(), &url);

        if signed {
            let mut headers = HeaderMap::new();
            let key = HeaderValue::from_str(&self.config.api_key)
                .map_err(|_| ClientError::Setup("api key is not a valid header value".into()))?;
            headers.insert(API_KEY_HEADER, key);
            request = request.headers(headers);
        }

        debug!(
            method = %method,
            endpoint = %endpoint,
            signed = signed,
            "sending request"
        );

        let response = request.send().await?;

        let status = response.status();
        let body = response.bytes().await?;

        if status.is_client_error() || status.is_server_error() {
            return Err(self.parse_error_response(status, &body));
        }

        Ok(body.to_vec())
    }

    /// Creates a ClientError from an error response.
    fn parse_error_response(&self, status: StatusCode, body: &[u8]) -> ClientError {
        #[derive(Deserialize)]
        struct ErrorResponse {
            code: Option<i32>,
            msg: Option<String>,
        }

        let api_err = match serde_json::from_slice::<ErrorResponse>(body) {
            Ok(resp) => ApiError {
                code: resp.code.unwrap_or(status.as_u16() as i32),
                message: resp
                    .msg
                    .unwrap_or_else(|| String::from_utf8_lossy(body).to_string()),
                status: status.as_u16(),
            },
            Err(_) => ApiError {
                code: status.as_u16() as i32,
                message: String::from_utf8_lossy(body).to_string(),
                status: status.as_u16(),
            },
        };

        warn!(code = api_err.code, status = api_err.status, message = %api_err.message, "api error");

        ClientError::Api(api_err)
    }

    /// Returns the endpoint this client talks to.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }
}
