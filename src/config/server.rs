//! HTTP server configuration.

use serde::Deserialize;

/// HTTP listener and persistence settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,
    /// Path of the JSON credentials document.
    pub credentials_path: String,
    /// Allow cross-origin requests from any origin.
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            credentials_path: "config.json".to_string(),
            cors: true,
        }
    }
}
