use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::apy::yield_of;

use super::vault::VaultId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionKind {
    Deposit,
    Withdrawal,
    /// Synthetic holding inferred from a balance with no transfer history.
    Estimated,
}

impl fmt::Display for PositionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            PositionKind::Deposit => "deposit",
            PositionKind::Withdrawal => "withdrawal",
            PositionKind::Estimated => "estimated",
        };
        write!(f, "{kind}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub kind: PositionKind,
    pub amount: Decimal,
    /// Price-per-share at the time of the event.
    pub price: Decimal,
    pub timestamp: i64,
    pub days_held: f64,
    pub vault: VaultId,
}

impl Position {
    /// Yield shown next to the position in a history table.
    ///
    /// Held positions are marked to `current_price`; withdrawals are priced at
    /// their own exit price and therefore show zero.
    pub fn display_yield(&self, current_price: Decimal) -> Decimal {
        match self.kind {
            PositionKind::Deposit | PositionKind::Estimated => {
                yield_of(self.amount, self.price, current_price)
            }
            PositionKind::Withdrawal => yield_of(self.amount, self.price, self.price),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultYieldResult {
    pub positions: Vec<Position>,
    pub total_yield: Decimal,
    /// Percent.
    pub overall_apy: f64,
    pub avg_deposit_price: Decimal,
    pub total_invested: Decimal,
    pub total_deposited: Decimal,
    pub total_withdrawn: Decimal,
    pub current_balance: Decimal,
    pub current_price: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedResult {
    pub usd: VaultYieldResult,
    pub plus: VaultYieldResult,
    pub total_yield: Decimal,
    /// Percent of combined invested capital.
    pub overall_apy: f64,
    pub positions: Vec<Position>,
}

impl CombinedResult {
    pub fn vault(&self, vault: VaultId) -> &VaultYieldResult {
        match vault {
            VaultId::Usd => &self.usd,
            VaultId::Plus => &self.plus,
        }
    }

    /// Merged positions ordered by event time; equal timestamps keep merge order.
    pub fn sorted_positions(&self) -> Vec<Position> {
        let mut positions = self.positions.clone();
        positions.sort_by_key(|p| p.timestamp);
        positions
    }
}
