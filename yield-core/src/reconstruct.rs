use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::apy::{apy, days_between, yield_of};
use crate::models::{Direction, Position, PositionKind, RawTransfer, VaultId, VaultYieldResult};
use crate::oracle::PriceOracle;

/// Running blended cost basis of one vault.
#[derive(Debug, Default)]
struct CostBasis {
    total_deposited: Decimal,
    total_withdrawn: Decimal,
    // sum of amount * price over deposits
    weighted_price_sum: Decimal,
}

impl CostBasis {
    fn deposit(&mut self, amount: Decimal, price: Decimal) {
        self.total_deposited = self.total_deposited.saturating_add(amount);
        self.weighted_price_sum = self
            .weighted_price_sum
            .saturating_add(amount.saturating_mul(price));
    }

    fn withdraw(&mut self, amount: Decimal) {
        self.total_withdrawn = self.total_withdrawn.saturating_add(amount);
    }

    /// Deposit-weighted mean price of everything deposited so far.
    fn avg_price(&self) -> Option<Decimal> {
        if self.total_deposited > Decimal::ZERO {
            self.weighted_price_sum.checked_div(self.total_deposited)
        } else {
            None
        }
    }
}

/// Rebuilds the positions, realised plus unrealised yield and APY of one vault.
///
/// `transfers` must already be restricted to `vault` and ordered by block time.
/// Withdrawals realise yield against the blended basis known at that point of
/// the scan; the remaining balance is marked against the basis after the scan.
/// A wallet holding a balance with no usable history gets a single estimated
/// position priced at the start of the vault's price history.
pub fn reconstruct(
    transfers: &[RawTransfer],
    current_balance: Decimal,
    vault: VaultId,
    oracle: &PriceOracle,
    now: i64,
) -> VaultYieldResult {
    let current_balance = current_balance.max(Decimal::ZERO);
    let current_price = oracle.latest_price(vault);

    let mut basis = CostBasis::default();
    let mut positions: Vec<Position> = Vec::new();
    let mut total_yield = Decimal::ZERO;

    for transfer in transfers {
        let Some(timestamp) = transfer.timestamp_seconds() else {
            if transfer.block_timestamp.is_some() {
                warn!("Skipping {vault} transfer with unparseable timestamp: {transfer:?}");
            } else {
                debug!("Skipping {vault} transfer without timestamp: {transfer:?}");
            }
            continue;
        };

        let amount = transfer.value.max(Decimal::ZERO);
        let price = oracle.price_at(timestamp, vault);
        let kind = match transfer.direction {
            Direction::Incoming => PositionKind::Deposit,
            Direction::Outgoing => PositionKind::Withdrawal,
        };

        positions.push(Position {
            kind,
            amount,
            price,
            timestamp,
            days_held: days_between(timestamp, now),
            vault,
        });

        match transfer.direction {
            Direction::Incoming => basis.deposit(amount, price),
            Direction::Outgoing => {
                basis.withdraw(amount);
                if let Some(avg_price) = basis.avg_price() {
                    total_yield = total_yield.saturating_add(yield_of(amount, avg_price, price));
                }
            }
        }
    }

    debug!(
        "{vault} scan: deposited={} withdrawn={} balance={current_balance} positions={}",
        basis.total_deposited,
        basis.total_withdrawn,
        positions.len()
    );

    if positions.is_empty() && current_balance > Decimal::ZERO {
        return estimate_from_history(current_balance, current_price, vault, oracle, now);
    }

    let avg_deposit_price = basis.avg_price();
    if let Some(avg_price) = avg_deposit_price {
        if current_balance > Decimal::ZERO {
            total_yield =
                total_yield.saturating_add(yield_of(current_balance, avg_price, current_price));
        }
    }

    let overall_apy = match avg_deposit_price {
        Some(avg_price) if !positions.is_empty() => {
            let avg_days_held =
                positions.iter().map(|p| p.days_held).sum::<f64>() / positions.len() as f64;
            apy(avg_price, current_price, avg_days_held)
        }
        _ => 0.0,
    };

    let avg_deposit_price = avg_deposit_price.unwrap_or(Decimal::ZERO);
    VaultYieldResult {
        positions,
        total_yield,
        overall_apy,
        avg_deposit_price,
        total_invested: basis.total_deposited.saturating_mul(avg_deposit_price),
        total_deposited: basis.total_deposited,
        total_withdrawn: basis.total_withdrawn,
        current_balance,
        current_price,
    }
}

/// Treats the whole balance as bought at the first known price of the vault.
fn estimate_from_history(
    current_balance: Decimal,
    current_price: Decimal,
    vault: VaultId,
    oracle: &PriceOracle,
    now: i64,
) -> VaultYieldResult {
    debug!("No {vault} transfer history, estimating from earliest price");

    let (earliest_price, earliest_time) = oracle
        .earliest_snapshot(vault)
        .map(|snapshot| (snapshot.price_per_share, snapshot.timestamp))
        .unwrap_or((Decimal::ONE, now));
    let days_held = days_between(earliest_time, now);

    VaultYieldResult {
        positions: vec![Position {
            kind: PositionKind::Estimated,
            amount: current_balance,
            price: earliest_price,
            timestamp: earliest_time,
            days_held,
            vault,
        }],
        total_yield: yield_of(current_balance, earliest_price, current_price),
        overall_apy: apy(earliest_price, current_price, days_held),
        avg_deposit_price: earliest_price,
        total_invested: current_balance.saturating_mul(earliest_price),
        total_deposited: current_balance,
        total_withdrawn: Decimal::ZERO,
        current_balance,
        current_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PriceSeries, PriceSnapshot};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    const DAY: i64 = 86_400;

    fn iso(timestamp: i64) -> String {
        Utc.timestamp_opt(timestamp, 0).unwrap().to_rfc3339()
    }

    fn transfer(direction: Direction, value: Decimal, timestamp: i64) -> RawTransfer {
        RawTransfer::new(None, value, direction, Some(iso(timestamp)))
    }

    fn usd_oracle(snapshots: Vec<(i64, Decimal)>) -> PriceOracle {
        let series: PriceSeries = snapshots
            .into_iter()
            .map(|(ts, price)| PriceSnapshot::new(ts, price))
            .collect();
        PriceOracle::new(series, PriceSeries::default())
    }

    #[test]
    fn test_no_transfers_no_balance() {
        let oracle = usd_oracle(vec![(0, dec!(1)), (DAY, dec!(1.1))]);
        let result = reconstruct(&[], Decimal::ZERO, VaultId::Usd, &oracle, 10 * DAY);
        assert!(result.positions.is_empty());
        assert_eq!(result.total_yield, Decimal::ZERO);
        assert_eq!(result.overall_apy, 0.0);
        assert_eq!(result.total_invested, Decimal::ZERO);
    }

    #[test]
    fn test_balance_without_history_is_estimated() {
        let oracle = usd_oracle(vec![(0, dec!(1)), (100 * DAY, dec!(1.05))]);
        let now = 365 * DAY;
        let result = reconstruct(&[], dec!(200), VaultId::Usd, &oracle, now);

        assert_eq!(result.positions.len(), 1);
        let estimated = &result.positions[0];
        assert_eq!(estimated.kind, PositionKind::Estimated);
        assert_eq!(estimated.amount, dec!(200));
        assert_eq!(estimated.price, dec!(1));
        assert_eq!(estimated.timestamp, 0);
        assert_eq!(estimated.days_held, 365.0);

        assert_eq!(result.total_yield, dec!(10));
        assert_eq!(result.avg_deposit_price, dec!(1));
        assert_eq!(result.total_invested, dec!(200));
        assert!((result.overall_apy - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_with_empty_series() {
        let oracle = PriceOracle::default();
        let result = reconstruct(&[], dec!(5), VaultId::Plus, &oracle, 1_000);
        assert_eq!(result.positions.len(), 1);
        assert_eq!(result.positions[0].timestamp, 1_000);
        assert_eq!(result.positions[0].days_held, 0.0);
        assert_eq!(result.total_yield, Decimal::ZERO);
        assert_eq!(result.overall_apy, 0.0);
        assert_eq!(result.total_invested, dec!(5));
    }

    #[test]
    fn test_transfers_without_timestamp_fall_back_to_estimate() {
        let oracle = usd_oracle(vec![(0, dec!(1)), (DAY, dec!(1.2))]);
        let mut undated = transfer(Direction::Incoming, dec!(50), 0);
        undated.block_timestamp = None;
        let mut garbled = transfer(Direction::Outgoing, dec!(10), 0);
        garbled.block_timestamp = Some("not a date".to_string());

        let result = reconstruct(&[undated, garbled], dec!(10), VaultId::Usd, &oracle, 2 * DAY);
        assert_eq!(result.positions.len(), 1);
        assert_eq!(result.positions[0].kind, PositionKind::Estimated);
        assert_eq!(result.total_yield, dec!(2));
    }

    #[test]
    fn test_single_deposit_held_one_year() {
        let oracle = usd_oracle(vec![(0, dec!(1)), (300 * DAY, dec!(1.02))]);
        let transfers = vec![transfer(Direction::Incoming, dec!(100), 0)];
        let result = reconstruct(&transfers, dec!(100), VaultId::Usd, &oracle, 365 * DAY);

        assert_eq!(result.positions.len(), 1);
        assert_eq!(result.positions[0].kind, PositionKind::Deposit);
        assert_eq!(result.positions[0].price, dec!(1));
        assert_eq!(result.positions[0].days_held, 365.0);
        assert_eq!(result.total_yield, dec!(2));
        assert!((result.overall_apy - 2.0).abs() < 1e-9, "apy was {}", result.overall_apy);
        assert_eq!(result.avg_deposit_price, dec!(1));
        assert_eq!(result.total_invested, dec!(100));
    }

    #[test]
    fn test_partial_withdrawal_realises_against_blended_basis() {
        let t = 30 * DAY;
        let oracle = usd_oracle(vec![(0, dec!(1)), (t, dec!(1.1)), (60 * DAY, dec!(1.2))]);
        let transfers = vec![
            transfer(Direction::Incoming, dec!(100), 0),
            transfer(Direction::Outgoing, dec!(40), t),
        ];
        let result = reconstruct(&transfers, dec!(60), VaultId::Usd, &oracle, 90 * DAY);

        assert_eq!(result.positions.len(), 2);
        assert_eq!(result.positions[1].kind, PositionKind::Withdrawal);
        assert_eq!(result.positions[1].price, dec!(1.1));
        // 40 * (1.1 - 1) realised + 60 * (1.2 - 1) unrealised
        assert_eq!(result.total_yield, dec!(16));
        assert_eq!(result.total_deposited, dec!(100));
        assert_eq!(result.total_withdrawn, dec!(40));
        assert_eq!(result.total_invested, dec!(100));

        let avg_days = (90.0 + 60.0) / 2.0;
        let expected_apy = apy(dec!(1), dec!(1.2), avg_days);
        assert!((result.overall_apy - expected_apy).abs() < 1e-12);
    }

    #[test]
    fn test_withdrawal_uses_basis_at_time_of_scan() {
        let oracle = usd_oracle(vec![(0, dec!(1)), (DAY, dec!(1.5)), (2 * DAY, dec!(2))]);
        let transfers = vec![
            transfer(Direction::Incoming, dec!(10), 0),
            transfer(Direction::Outgoing, dec!(10), DAY),
            transfer(Direction::Incoming, dec!(10), 2 * DAY),
        ];
        let result = reconstruct(&transfers, dec!(10), VaultId::Usd, &oracle, 3 * DAY);

        // withdrawal realises 10 * (1.5 - 1) against the basis before the later deposit;
        // the remaining balance is marked against the final blended basis of 1.5
        assert_eq!(result.avg_deposit_price, dec!(1.5));
        assert_eq!(result.total_yield, dec!(5) + dec!(5));
        assert_eq!(result.total_invested, dec!(30));
    }

    #[test]
    fn test_withdrawal_before_any_deposit_realises_nothing() {
        let oracle = usd_oracle(vec![(0, dec!(1)), (DAY, dec!(1.3))]);
        let transfers = vec![transfer(Direction::Outgoing, dec!(25), DAY)];
        let result = reconstruct(&transfers, Decimal::ZERO, VaultId::Usd, &oracle, 2 * DAY);

        assert_eq!(result.positions.len(), 1);
        assert_eq!(result.total_yield, Decimal::ZERO);
        assert_eq!(result.overall_apy, 0.0);
        assert_eq!(result.avg_deposit_price, Decimal::ZERO);
        assert_eq!(result.total_invested, Decimal::ZERO);
    }

    #[test]
    fn test_future_dated_transfers_give_zero_apy() {
        let oracle = usd_oracle(vec![(0, dec!(1)), (DAY, dec!(1.1))]);
        let transfers = vec![transfer(Direction::Incoming, dec!(10), 5 * DAY)];
        let result = reconstruct(&transfers, dec!(10), VaultId::Usd, &oracle, DAY);

        assert!(result.positions[0].days_held < 0.0);
        assert_eq!(result.overall_apy, 0.0);
        assert_eq!(result.total_yield, Decimal::ZERO);
    }

    #[test]
    fn test_negative_amount_is_treated_as_zero() {
        let oracle = usd_oracle(vec![(0, dec!(1)), (DAY, dec!(1.1))]);
        let transfers = vec![
            transfer(Direction::Incoming, dec!(-5), 0),
            transfer(Direction::Incoming, dec!(10), 0),
        ];
        let result = reconstruct(&transfers, dec!(10), VaultId::Usd, &oracle, 2 * DAY);

        assert_eq!(result.positions[0].amount, Decimal::ZERO);
        assert_eq!(result.total_deposited, dec!(10));
        assert_eq!(result.total_yield, dec!(1));
    }

    #[test]
    fn test_out_of_range_amounts_saturate() {
        let huge = Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0);
        let oracle = usd_oracle(vec![(0, dec!(2)), (DAY, dec!(3))]);
        let transfers = vec![
            transfer(Direction::Incoming, huge, 0),
            transfer(Direction::Incoming, huge, DAY),
            transfer(Direction::Outgoing, huge, DAY),
        ];
        let result = reconstruct(&transfers, huge, VaultId::Usd, &oracle, 2 * DAY);

        assert_eq!(result.positions.len(), 3);
        assert_eq!(result.total_deposited, Decimal::MAX);
        assert_eq!(result.total_withdrawn, huge);
        assert!(result.avg_deposit_price > Decimal::ZERO);
        assert!(result.overall_apy.is_finite());
    }

    #[test]
    fn test_estimate_with_extreme_snapshot_timestamp() {
        let huge = Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0);
        let oracle = usd_oracle(vec![(i64::MIN, dec!(2)), (DAY, dec!(3))]);
        let result = reconstruct(&[], huge, VaultId::Usd, &oracle, DAY);

        assert_eq!(result.positions[0].kind, PositionKind::Estimated);
        assert_eq!(result.total_invested, Decimal::MAX);
        assert!(result.positions[0].days_held > 0.0);
    }

    #[test]
    fn test_negative_balance_is_treated_as_zero() {
        let oracle = usd_oracle(vec![(0, dec!(1))]);
        let result = reconstruct(&[], dec!(-3), VaultId::Usd, &oracle, DAY);
        assert!(result.positions.is_empty());
        assert_eq!(result.current_balance, Decimal::ZERO);
    }

    #[test]
    fn test_positions_tagged_with_vault_and_current_price() {
        let plus = PriceSeries::new(vec![
            PriceSnapshot::new(0, dec!(1)),
            PriceSnapshot::new(DAY, dec!(1.0026)),
        ]);
        let oracle = PriceOracle::new(PriceSeries::default(), plus);
        let transfers = vec![transfer(Direction::Incoming, dec!(3), 0)];
        let result = reconstruct(&transfers, dec!(3), VaultId::Plus, &oracle, DAY);

        assert_eq!(result.positions[0].vault, VaultId::Plus);
        assert_eq!(result.current_price, dec!(1.0026));
        assert_eq!(result.total_yield, dec!(0.0078));
    }
}
