use serde::Serialize;
use tracing::debug;

use crate::models::{RawTransfer, VaultId};

/// Transfers split by the vault token they move. Input order is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassifiedTransfers {
    pub usd: Vec<RawTransfer>,
    pub plus: Vec<RawTransfer>,
}

impl ClassifiedTransfers {
    pub fn for_vault(&self, vault: VaultId) -> &[RawTransfer] {
        match vault {
            VaultId::Usd => &self.usd,
            VaultId::Plus => &self.plus,
        }
    }
}

/// Buckets `transfers` by contract address.
///
/// Unrecognised or missing addresses land in the `usd` bucket.
pub fn classify(transfers: &[RawTransfer], usd_address: &str, plus_address: &str) -> ClassifiedTransfers {
    let mut classified = ClassifiedTransfers::default();
    for transfer in transfers {
        let vault = VaultId::from_address(
            transfer.contract_address.as_deref(),
            usd_address,
            plus_address,
        );
        match vault {
            VaultId::Usd => classified.usd.push(transfer.clone()),
            VaultId::Plus => classified.plus.push(transfer.clone()),
        }
    }

    debug!(
        "Classified transfers: usd={} plus={}",
        classified.usd.len(),
        classified.plus.len()
    );
    classified
}
