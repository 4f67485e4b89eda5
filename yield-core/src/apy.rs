use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Fractional days from `from` to `to`, both Unix seconds. Negative when `from` is later.
pub fn days_between(from: i64, to: i64) -> f64 {
    to.saturating_sub(from) as f64 / SECONDS_PER_DAY
}

/// Annualised yield in percent for a share bought at `deposit_price` and now
/// worth `current_price` after `days_held` days.
///
/// The observed return is converted to a daily compounding rate and compounded
/// over 365 days. Non-positive holding periods and non-positive deposit prices
/// resolve to 0.
pub fn apy(deposit_price: Decimal, current_price: Decimal, days_held: f64) -> f64 {
    if !(days_held > 0.0) || deposit_price <= Decimal::ZERO {
        return 0.0;
    }

    let ratio = match current_price
        .checked_div(deposit_price)
        .and_then(|r| r.to_f64())
    {
        Some(ratio) => ratio,
        None => return 0.0,
    };

    let daily_return = ratio.powf(1.0 / days_held) - 1.0;
    let annual_return = (1.0 + daily_return).powf(DAYS_PER_YEAR) - 1.0;
    let percent = annual_return * 100.0;

    if percent.is_finite() { percent } else { 0.0 }
}

/// Gain on `amount` shares moving from `deposit_price` to `current_price`.
///
/// Values beyond the Decimal range saturate.
pub fn yield_of(amount: Decimal, deposit_price: Decimal, current_price: Decimal) -> Decimal {
    let initial_value = amount.saturating_mul(deposit_price);
    let current_value = amount.saturating_mul(current_price);
    current_value.saturating_sub(initial_value)
}
