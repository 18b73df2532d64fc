//! Configuration loading and validation for the bracket service.
//!
//! Uses serde_yaml to load the service configuration with environment
//! overrides for deployment-specific values. Exchange credentials live in a
//! separate JSON document managed by [`CredentialStore`].

mod app;
mod credentials;
mod duration;
mod error;
mod exchange;
mod server;

pub use app::AppConfig;
pub use credentials::{CredentialStore, ExchangeCredentials};
pub use error::{ConfigError, CredentialError};
pub use exchange::ExchangeConfig;
pub use server::ServerConfig;

use serde::Deserialize;
use std::net::SocketAddr;
use std::{env, fs};

use crate::domain::ClientOrderId;

/// Length of the random part of a client order id.
pub const CLIENT_ORDER_SUFFIX_LEN: usize = 7;

/// Root configuration structure for the bracket service.
///
/// Required sections: app.
/// Optional sections: server, exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Application-level settings like name and environment.
    pub app: AppConfig,
    /// HTTP listener and credentials location.
    #[serde(default)]
    pub server: ServerConfig,
    /// Futures exchange endpoints and order settings.
    #[serde(default)]
    pub exchange: ExchangeConfig,
}

impl Config {
    /// Load configuration from a YAML file at the given path.
    ///
    /// First loads environment variables from `.env` file (if exists),
    /// then applies overrides from:
    /// - `BIND_ADDR` for `server.bind`
    /// - `CREDENTIALS_PATH` for `server.credentials_path`
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production).
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("BIND_ADDR").filter(|v| !v.is_empty()) {
            self.server.bind = bind;
        }
        if let Some(path) = lookup("CREDENTIALS_PATH").filter(|v| !v.is_empty()) {
            self.server.credentials_path = path;
        }
    }

    /// Parsed listener address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind.parse().map_err(|_| {
            ConfigError::Validation(format!("server.bind is not a socket address: {}", self.server.bind))
        })
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.app.name.is_empty() {
            return Err(ConfigError::Validation("app.name is required".into()));
        }

        self.bind_addr()?;

        if self.server.credentials_path.is_empty() {
            return Err(ConfigError::Validation(
                "server.credentials_path is required".into(),
            ));
        }

        let prefix = &self.exchange.client_order_prefix;
        if !ClientOrderId::is_valid_charset(prefix) {
            return Err(ConfigError::Validation(format!(
                "exchange.client_order_prefix contains invalid characters: {}",
                prefix
            )));
        }
        if prefix.len() + CLIENT_ORDER_SUFFIX_LEN > ClientOrderId::MAX_LEN {
            return Err(ConfigError::Validation(format!(
                "exchange.client_order_prefix is longer than {} characters",
                ClientOrderId::MAX_LEN - CLIENT_ORDER_SUFFIX_LEN
            )));
        }

        if self.exchange.request_timeout.is_zero() {
            return Err(ConfigError::Validation(
                "exchange.request_timeout must be positive".into(),
            ));
        }

        Ok(())
    }
}
