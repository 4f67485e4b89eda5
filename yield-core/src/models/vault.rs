use std::fmt;

use serde::{Deserialize, Serialize};

/// Static description of a vault share token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultConfig {
    pub name: &'static str,
    pub address: &'static str,
    pub decimals: u32,
    pub symbol: &'static str,
}

pub const USD_VAULT: VaultConfig = VaultConfig {
    name: "AUTONOMOUS LIQUIDITY USD",
    address: "0xDCD0f5ab30856F28385F641580Bbd85f88349124",
    decimals: 18,
    symbol: "aiUSD",
};

pub const PLUS_VAULT: VaultConfig = VaultConfig {
    name: "AUTONOMOUS LIQUIDITY PLUS",
    address: "0x5a97B0B97197299456Af841F8605543b13b12eE3",
    decimals: 18,
    symbol: "alpUSD",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultId {
    Usd,
    Plus,
}

impl VaultId {
    pub const ALL: [VaultId; 2] = [VaultId::Usd, VaultId::Plus];

    pub fn config(&self) -> &'static VaultConfig {
        match self {
            VaultId::Usd => &USD_VAULT,
            VaultId::Plus => &PLUS_VAULT,
        }
    }

    /// Resolves a token contract address to its vault.
    ///
    /// Comparison is case-insensitive. Addresses matching neither vault, and
    /// transfers with no address at all, are attributed to `Usd`.
    pub fn from_address(address: Option<&str>, usd_address: &str, plus_address: &str) -> VaultId {
        match address {
            Some(addr) if addr.eq_ignore_ascii_case(usd_address) => VaultId::Usd,
            Some(addr) if addr.eq_ignore_ascii_case(plus_address) => VaultId::Plus,
            _ => VaultId::Usd,
        }
    }
}

impl fmt::Display for VaultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultId::Usd => write!(f, "USD"),
            VaultId::Plus => write!(f, "PLUS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_address_is_case_insensitive() {
        let upper = PLUS_VAULT.address.to_uppercase().replacen("0X", "0x", 1);
        assert_eq!(
            VaultId::from_address(Some(&upper), USD_VAULT.address, PLUS_VAULT.address),
            VaultId::Plus
        );
        assert_eq!(
            VaultId::from_address(
                Some(&USD_VAULT.address.to_lowercase()),
                USD_VAULT.address,
                PLUS_VAULT.address
            ),
            VaultId::Usd
        );
    }

    #[test]
    fn test_unknown_and_missing_address_default_to_usd() {
        assert_eq!(
            VaultId::from_address(
                Some("0x0000000000000000000000000000000000000001"),
                USD_VAULT.address,
                PLUS_VAULT.address
            ),
            VaultId::Usd
        );
        assert_eq!(
            VaultId::from_address(None, USD_VAULT.address, PLUS_VAULT.address),
            VaultId::Usd
        );
    }

    #[test]
    fn test_vault_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&VaultId::Plus).unwrap(), "\"plus\"");
        assert_eq!(VaultId::Plus.to_string(), "PLUS");
        assert_eq!(VaultId::Usd.config().symbol, "aiUSD");
    }
}
