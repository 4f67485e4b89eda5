use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::models::{CombinedResult, VaultYieldResult};

/// Folds both vault results into a wallet-wide view.
///
/// The overall APY is the combined yield as a percentage of the combined
/// invested capital, or 0 when nothing was invested.
pub fn combine(usd: VaultYieldResult, plus: VaultYieldResult) -> CombinedResult {
    let total_yield = usd.total_yield.saturating_add(plus.total_yield);
    let total_invested = usd.total_invested.saturating_add(plus.total_invested);

    let overall_apy = if total_invested > Decimal::ZERO {
        total_yield
            .checked_div(total_invested)
            .and_then(|ratio| ratio.to_f64())
            .map(|ratio| ratio * 100.0)
            .unwrap_or(0.0)
    } else {
        0.0
    };

    let positions = usd
        .positions
        .iter()
        .chain(plus.positions.iter())
        .cloned()
        .collect();

    CombinedResult {
        usd,
        plus,
        total_yield,
        overall_apy,
        positions,
    }
}
