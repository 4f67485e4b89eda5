//! Yield accounting for wallets holding vault share tokens.
//!
//! Nothing here performs I/O: price histories, balances and transfer lists are
//! resolved by the caller and passed in. Every entry point is a pure function
//! over those inputs and has a defined result for empty or degenerate data.

pub mod aggregate;
pub mod apy;
pub mod classifier;
pub mod models;
pub mod oracle;
pub mod reconstruct;

pub use aggregate::combine;
pub use apy::{apy, yield_of};
pub use classifier::{ClassifiedTransfers, classify};
pub use oracle::PriceOracle;
pub use reconstruct::reconstruct;

use rust_decimal::Decimal;

use models::{CombinedResult, PLUS_VAULT, RawTransfer, USD_VAULT, VaultId};

/// Current token balance of each vault, in whole tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct VaultBalances {
    pub usd: Decimal,
    pub plus: Decimal,
}

impl VaultBalances {
    pub fn get(&self, vault: VaultId) -> Decimal {
        match vault {
            VaultId::Usd => self.usd,
            VaultId::Plus => self.plus,
        }
    }
}

/// Classifies a wallet's transfers, reconstructs both vaults and combines them.
pub fn analyze_wallet(
    transfers: &[RawTransfer],
    balances: VaultBalances,
    oracle: &PriceOracle,
    now: i64,
) -> CombinedResult {
    let classified = classify(transfers, USD_VAULT.address, PLUS_VAULT.address);
    let [usd, plus] = VaultId::ALL.map(|vault| {
        reconstruct(
            classified.for_vault(vault),
            balances.get(vault),
            vault,
            oracle,
            now,
        )
    });
    combine(usd, plus)
}
