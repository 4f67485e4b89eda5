use chrono::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which side of the wallet a transfer sits on, fixed when the transfer is ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// Vault token transfer as reported by the blockchain API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransfer {
    pub contract_address: Option<String>,
    pub value: Decimal,
    pub direction: Direction,
    /// ISO-8601 block timestamp, e.g. `2025-06-10T07:07:35.000Z`.
    pub block_timestamp: Option<String>,
}

impl RawTransfer {
    pub fn new(
        contract_address: Option<String>,
        value: Decimal,
        direction: Direction,
        block_timestamp: Option<String>,
    ) -> Self {
        RawTransfer {
            contract_address,
            value,
            direction,
            block_timestamp,
        }
    }

    /// Block time in Unix seconds, `None` when absent or unparseable.
    pub fn timestamp_seconds(&self) -> Option<i64> {
        let raw = self.block_timestamp.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|ts| ts.timestamp())
    }
}
