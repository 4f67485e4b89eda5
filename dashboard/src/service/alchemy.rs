use std::time::Duration;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use yield_core::VaultBalances;
use yield_core::models::{Direction, RawTransfer, VaultId};

use crate::models::alchemy::{
    AssetTransfersParams, AssetTransfersResult, RpcRequest, RpcResponse, TokenBalancesResult,
    parse_token_balance,
};
use crate::models::settings::AlchemyConfig;

const GET_TOKEN_BALANCES: &str = "alchemy_getTokenBalances";
const GET_ASSET_TRANSFERS: &str = "alchemy_getAssetTransfers";

/// JSON-RPC client for wallet balances and vault token transfers.
#[derive(Debug, Clone)]
pub(crate) struct AlchemyClient {
    http: reqwest::Client,
    url: String,
    max_pages: u32,
}

impl AlchemyClient {
    pub fn new(config: &AlchemyConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build alchemy http client")?;
        Ok(Self {
            http,
            url: format!("{}{}", config.base_url, api_key),
            max_pages: config.max_pages.max(1),
        })
    }

    async fn call<P, T>(&self, method: &str, params: P, id: u64) -> Result<T>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(&self.url)
            .json(&RpcRequest::new(method, params, id))
            .send()
            .await
            .with_context(|| format!("{method} request failed"))?;

        let body: RpcResponse<T> = response
            .json()
            .await
            .with_context(|| format!("{method} returned an unreadable response"))?;
        body.into_result().with_context(|| format!("{method} failed"))
    }

    /// Current balance of both vault tokens held by `wallet`.
    pub async fn token_balances(&self, wallet: &str) -> Result<VaultBalances> {
        let contracts: Vec<&str> = VaultId::ALL.iter().map(|v| v.config().address).collect();
        let result: TokenBalancesResult = self
            .call(GET_TOKEN_BALANCES, (wallet, contracts), 1)
            .await?;
        balances_from_result(result)
    }

    /// Every vault token transfer into or out of `wallet`, ordered by block time.
    pub async fn asset_transfers(&self, wallet: &str) -> Result<Vec<RawTransfer>> {
        let (incoming, outgoing) = tokio::try_join!(
            self.transfers(wallet, Direction::Incoming),
            self.transfers(wallet, Direction::Outgoing),
        )?;

        let mut transfers: Vec<RawTransfer> = incoming.into_iter().chain(outgoing).collect();
        sort_by_block_time(&mut transfers);
        info!("All transfers found for {wallet}: {}", transfers.len());
        Ok(transfers)
    }

    async fn transfers(&self, wallet: &str, direction: Direction) -> Result<Vec<RawTransfer>> {
        let contracts = VaultId::ALL
            .iter()
            .map(|v| v.config().address.to_string())
            .collect();
        let mut params = AssetTransfersParams::new(wallet, direction, contracts);
        let id = match direction {
            Direction::Incoming => 1,
            Direction::Outgoing => 2,
        };

        let mut transfers = Vec::new();
        for page in 1..=self.max_pages {
            let result: AssetTransfersResult = self
                .call(GET_ASSET_TRANSFERS, [&params], id)
                .await
                .with_context(|| format!("{direction:?} transfers"))?;
            debug!("{direction:?} transfers page {page}: {}", result.transfers.len());

            transfers.extend(
                result
                    .transfers
                    .into_iter()
                    .map(|t| t.into_raw_transfer(direction)),
            );

            match result.page_key {
                Some(key) if page < self.max_pages => params.page_key = Some(key),
                Some(_) => warn!(
                    "{direction:?} transfers for {wallet} exceed {} pages, history truncated",
                    self.max_pages
                ),
                None => break,
            }
        }
        Ok(transfers)
    }
}

/// Maps the balance list onto vaults by contract address; unknown contracts are ignored.
pub(crate) fn balances_from_result(result: TokenBalancesResult) -> Result<VaultBalances> {
    let mut balances = VaultBalances::default();
    for token in result.token_balances {
        let Some(vault) = VaultId::ALL
            .into_iter()
            .find(|v| v.config().address.eq_ignore_ascii_case(&token.contract_address))
        else {
            warn!("Ignoring balance for unknown contract {}", token.contract_address);
            continue;
        };

        let balance = match token.token_balance.as_deref() {
            Some(hex) => parse_token_balance(hex, vault.config().decimals)?,
            None => Decimal::ZERO,
        };
        match vault {
            VaultId::Usd => balances.usd = balance,
            VaultId::Plus => balances.plus = balance,
        }
    }
    Ok(balances)
}

/// Stable sort by block time; transfers without a usable timestamp go first.
pub(crate) fn sort_by_block_time(transfers: &mut [RawTransfer]) {
    transfers.sort_by_key(|t| t.timestamp_seconds().unwrap_or(0));
}
