use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use tracing::warn;
use yield_core::models::{Direction, RawTransfer};

#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a, P: Serialize> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: P,
    pub id: u64,
}

impl<'a, P: Serialize> RpcRequest<'a, P> {
    pub fn new(method: &'a str, params: P, id: u64) -> Self {
        RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcError {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcError>,
}

impl<T> RpcResponse<T> {
    pub fn into_result(self) -> Result<T> {
        if let Some(error) = self.error {
            match error.code {
                Some(code) => bail!("RPC error {code}: {}", error.message),
                None => bail!("RPC error: {}", error.message),
            }
        }
        self.result.context("RPC response has neither result nor error")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenBalancesResult {
    #[serde(default)]
    pub token_balances: Vec<TokenBalance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenBalance {
    pub contract_address: String,
    /// Hex encoded integer in base units, e.g. `0x00..0de0b6b3a7640000`.
    pub token_balance: Option<String>,
}

/// Converts a hex base-unit balance into whole tokens.
pub(crate) fn parse_token_balance(hex: &str, decimals: u32) -> Result<Decimal> {
    let digits = hex.trim_start_matches("0x").trim_start_matches("0X");
    if digits.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let units = u128::from_str_radix(digits, 16)
        .with_context(|| format!("Invalid token balance: {hex}"))?;
    let units = i128::try_from(units).with_context(|| format!("Token balance too large: {hex}"))?;
    Decimal::try_from_i128_with_scale(units, decimals)
        .with_context(|| format!("Token balance out of range: {hex}"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssetTransfersParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    pub contract_addresses: Vec<String>,
    pub category: Vec<&'static str>,
    pub with_metadata: bool,
    pub exclude_zero_value: bool,
    pub max_count: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_key: Option<String>,
}

impl AssetTransfersParams {
    /// Transfers of `contracts` into (`Incoming`) or out of (`Outgoing`) `wallet`.
    pub fn new(wallet: &str, direction: Direction, contracts: Vec<String>) -> Self {
        let (from_address, to_address) = match direction {
            Direction::Incoming => (None, Some(wallet.to_string())),
            Direction::Outgoing => (Some(wallet.to_string()), None),
        };
        AssetTransfersParams {
            from_address,
            to_address,
            contract_addresses: contracts,
            category: vec!["erc20"],
            with_metadata: true,
            exclude_zero_value: true,
            max_count: "0x3e8",
            page_key: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssetTransfersResult {
    #[serde(default)]
    pub transfers: Vec<AssetTransfer>,
    #[serde(default)]
    pub page_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssetTransfer {
    #[serde(default)]
    pub raw_contract: Option<RawContract>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub metadata: Option<TransferMetadata>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawContract {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransferMetadata {
    #[serde(default)]
    pub block_timestamp: Option<String>,
}

impl AssetTransfer {
    pub fn into_raw_transfer(self, direction: Direction) -> RawTransfer {
        RawTransfer::new(
            self.raw_contract.and_then(|c| c.address),
            sanitize_amount(self.value),
            direction,
            self.metadata.and_then(|m| m.block_timestamp),
        )
    }
}

/// Missing, non-finite and negative amounts count as zero.
pub(crate) fn sanitize_amount(value: Option<f64>) -> Decimal {
    match value {
        None => Decimal::ZERO,
        Some(v) if !v.is_finite() || v < 0.0 => {
            warn!("Treating invalid transfer value {v} as zero");
            Decimal::ZERO
        }
        Some(v) => Decimal::from_f64(v).unwrap_or_else(|| {
            warn!("Transfer value {v} is out of range, treating as zero");
            Decimal::ZERO
        }),
    }
}
