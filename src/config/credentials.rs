//! Exchange credentials persisted as a JSON document.
//!
//! Layout: `{"EXCHANGES": {"BINANCE-FUTURES": {"API_KEY", "API_SECRET", "TESTNET"}}}`.
//! Unrelated keys in the document survive updates.

use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::CredentialError;

const EXCHANGES_KEY: &str = "EXCHANGES";

/// Section holding the futures account credentials.
pub const EXCHANGE_SECTION: &str = "BINANCE-FUTURES";

/// API credentials for the futures account.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeCredentials {
    #[serde(rename = "API_KEY", default)]
    pub api_key: String,
    #[serde(rename = "API_SECRET", default)]
    pub api_secret: String,
    #[serde(rename = "TESTNET", default)]
    pub testnet: bool,
}

impl fmt::Debug for ExchangeCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeCredentials")
            .field("api_key", &"***")
            .field("api_secret", &"***")
            .field("testnet", &self.testnet)
            .finish()
    }
}

/// Reads and rewrites the credentials document.
pub struct CredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Loads the futures credentials. Empty key or secret is an error.
    pub async fn load(&self) -> Result<ExchangeCredentials, CredentialError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(CredentialError::Read)?;
        let document: Value = serde_json::from_str(&content)?;

        let section = document
            .get(EXCHANGES_KEY)
            .and_then(|e| e.get(EXCHANGE_SECTION))
            .cloned()
            .ok_or_else(|| {
                CredentialError::Missing(format!("{}.{} section", EXCHANGES_KEY, EXCHANGE_SECTION))
            })?;

        let credentials: ExchangeCredentials = serde_json::from_value(section)?;

        if credentials.api_key.is_empty() || credentials.api_secret.is_empty() {
            return Err(CredentialError::Missing("API key and secret".into()));
        }

        debug!(path = %self.path.display(), testnet = credentials.testnet, "credentials loaded");

        Ok(credentials)
    }

    /// Merges new credentials into the document and rewrites it.
    /// The file is written next to the target and renamed over it.
    pub async fn update(&self, credentials: &ExchangeCredentials) -> Result<(), CredentialError> {
        let _guard = self.write_lock.lock().await;

        let mut document = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => serde_json::from_str::<Value>(&content)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Value::Object(Map::new()),
            Err(e) => return Err(CredentialError::Read(e)),
        };

        let section = section_mut(&mut document)?;
        section.insert("API_KEY".into(), Value::String(credentials.api_key.clone()));
        section.insert(
            "API_SECRET".into(),
            Value::String(credentials.api_secret.clone()),
        );
        section.insert("TESTNET".into(), Value::Bool(credentials.testnet));

        let content = serde_json::to_string_pretty(&document)?;

        let tmp_path = self.tmp_path();
        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(CredentialError::Write)?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(CredentialError::Write)?;

        info!(path = %self.path.display(), testnet = credentials.testnet, "credentials updated");

        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Returns the futures section, creating missing levels.
fn section_mut(document: &mut Value) -> Result<&mut Map<String, Value>, CredentialError> {
    let root = document
        .as_object_mut()
        .ok_or_else(|| CredentialError::Missing("credentials document is not an object".into()))?;

    let exchanges = root
        .entry(EXCHANGES_KEY)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| CredentialError::Missing(format!("{} is not an object", EXCHANGES_KEY)))?;

    exchanges
        .entry(EXCHANGE_SECTION)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| CredentialError::Missing(format!("{} is not an object", EXCHANGE_SECTION)))
}
