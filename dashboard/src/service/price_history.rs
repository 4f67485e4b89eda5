use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::time::sleep;
use tracing::{error, info, warn};
use yield_core::models::{PriceSeries, PriceSnapshot, VaultId};
use yield_core::oracle::PriceOracle;

use crate::models::settings::{PriceHistoryConfig, PriceSourceConfig};

/// Somewhere a vault price history can be fetched from.
pub(crate) trait PriceSeriesProvider {
    fn fetch(&self, location: &str) -> impl Future<Output = Result<Vec<PriceSnapshot>>> + Send;
}

/// Reads price histories from http(s) URLs or local files.
#[derive(Debug, Clone)]
pub(crate) struct PriceHistoryClient {
    http: reqwest::Client,
}

impl PriceHistoryClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build price history http client")?;
        Ok(Self { http })
    }

    async fn fetch_text(&self, location: &str) -> Result<String> {
        if location.starts_with("http://") || location.starts_with("https://") {
            let response = self
                .http
                .get(location)
                .query(&[("t", Utc::now().timestamp_millis())])
                .send()
                .await
                .with_context(|| format!("Failed to fetch {location}"))?;
            let status = response.status();
            if !status.is_success() {
                bail!("{location} failed with status: {status}");
            }
            Ok(response.text().await?)
        } else {
            tokio::fs::read_to_string(location)
                .await
                .with_context(|| format!("Failed to read {location}"))
        }
    }
}

impl PriceSeriesProvider for PriceHistoryClient {
    async fn fetch(&self, location: &str) -> Result<Vec<PriceSnapshot>> {
        let text = self.fetch_text(location).await?;
        parse_snapshots(&text).with_context(|| format!("Invalid price history in {location}"))
    }
}

fn parse_snapshots(text: &str) -> Result<Vec<PriceSnapshot>> {
    if text.trim().is_empty() {
        bail!("Empty response received");
    }
    let snapshots: Vec<PriceSnapshot> = serde_json::from_str(text)?;
    Ok(snapshots)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl From<&PriceHistoryConfig> for RetryPolicy {
    fn from(config: &PriceHistoryConfig) -> Self {
        RetryPolicy {
            max_attempts: config.max_attempts,
            delay: config.retry_delay(),
        }
    }
}

/// Two-point history bracketing the first deposit and a later redemption,
/// used when no price file can be loaded.
pub(crate) fn fallback_series(vault: VaultId) -> PriceSeries {
    let points = match vault {
        VaultId::Usd => [
            (1749539255, Decimal::ONE),
            (1756989167, Decimal::from_i128_with_scale(10190940943977502, 16)),
        ],
        VaultId::Plus => [
            (1755705155, Decimal::ONE),
            (1757021171, Decimal::from_i128_with_scale(10026472152184105, 16)),
        ],
    };
    points
        .into_iter()
        .map(|(timestamp, price)| PriceSnapshot::new(timestamp, price))
        .collect()
}

async fn fetch_once<P: PriceSeriesProvider>(
    provider: &P,
    source: &PriceSourceConfig,
) -> Result<Vec<PriceSnapshot>> {
    let primary = provider.fetch(&source.primary).await.and_then(non_empty);
    match (primary, &source.backup) {
        (Ok(snapshots), _) => Ok(snapshots),
        (Err(e), Some(backup)) => {
            warn!("{} failed: {e:#}, trying backup {backup}", source.primary);
            provider
                .fetch(backup)
                .await
                .and_then(non_empty)
                .context("Both price files failed")
        }
        (Err(e), None) => Err(e),
    }
}

fn non_empty(snapshots: Vec<PriceSnapshot>) -> Result<Vec<PriceSnapshot>> {
    if snapshots.is_empty() {
        bail!("Price history is empty");
    }
    Ok(snapshots)
}

/// Loads one vault's history, retrying per `policy` and falling back to the
/// static series once every attempt has failed. Never fails.
pub(crate) async fn load_price_series<P: PriceSeriesProvider>(
    provider: &P,
    vault: VaultId,
    source: &PriceSourceConfig,
    policy: &RetryPolicy,
) -> PriceSeries {
    let attempts = policy.max_attempts.max(1);
    for attempt in 1..=attempts {
        info!("Fetching {vault} price history (attempt {attempt})");
        match fetch_once(provider, source).await {
            Ok(snapshots) => {
                info!("{vault} price history loaded: {} entries", snapshots.len());
                return PriceSeries::new(snapshots);
            }
            Err(e) => {
                warn!("Error loading {vault} price history (attempt {attempt}): {e:#}");
                if attempt < attempts {
                    sleep(policy.delay).await;
                }
            }
        }
    }

    error!("Failed to load {vault} price history after {attempts} attempts, using fallback data");
    fallback_series(vault)
}

/// Loads both vault histories concurrently.
pub(crate) async fn load_oracle<P: PriceSeriesProvider>(
    provider: &P,
    config: &PriceHistoryConfig,
) -> PriceOracle {
    let policy = RetryPolicy::from(config);
    let (usd, plus) = tokio::join!(
        load_price_series(provider, VaultId::Usd, config.source(VaultId::Usd), &policy),
        load_price_series(provider, VaultId::Plus, config.source(VaultId::Plus), &policy),
    );
    PriceOracle::new(usd, plus)
}
