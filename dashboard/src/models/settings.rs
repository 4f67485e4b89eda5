use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use common::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use yield_core::models::VaultId;

const ALCHEMY_API_KEY: &str = "ALCHEMY_API_KEY";

#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub alchemy: AlchemyConfig,
    #[serde(default)]
    pub prices: PriceHistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlchemyConfig {
    pub base_url: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Upper bound on `pageKey` pages followed per transfer query.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_max_pages() -> u32 {
    10
}

impl AlchemyConfig {
    /// API key from the settings file, else from `ALCHEMY_API_KEY`.
    pub fn api_key(&self) -> Result<String> {
        match &self.api_key {
            Some(key) => Ok(key.clone()),
            None => env::var(ALCHEMY_API_KEY)
                .with_context(|| format!("No api_key in settings and {ALCHEMY_API_KEY} is not set")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSourceConfig {
    /// File path or http(s) URL of a JSON price history.
    pub primary: String,
    #[serde(default)]
    pub backup: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceHistoryConfig {
    pub usd: PriceSourceConfig,
    pub plus: PriceSourceConfig,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for PriceHistoryConfig {
    fn default() -> Self {
        PriceHistoryConfig {
            usd: PriceSourceConfig {
                primary: "price.json".to_string(),
                backup: Some("price_backup.json".to_string()),
            },
            plus: PriceSourceConfig {
                primary: "priceplus.json".to_string(),
                backup: None,
            },
            max_attempts: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl PriceHistoryConfig {
    pub fn source(&self, vault: VaultId) -> &PriceSourceConfig {
        match vault {
            VaultId::Usd => &self.usd,
            VaultId::Plus => &self.plus,
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
