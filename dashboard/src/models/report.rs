use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use yield_core::models::{CombinedResult, PositionKind, VaultId, VaultYieldResult};
use yield_core::oracle::PriceOracle;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct VaultSummary {
    pub vault: VaultId,
    pub name: &'static str,
    pub symbol: &'static str,
    pub balance: Decimal,
    pub current_price: Decimal,
    pub market_value: Decimal,
    pub total_yield: Decimal,
    pub overall_apy: f64,
    pub avg_deposit_price: Decimal,
    pub total_invested: Decimal,
}

impl VaultSummary {
    fn new(vault: VaultId, result: &VaultYieldResult) -> Self {
        let config = vault.config();
        VaultSummary {
            vault,
            name: config.name,
            symbol: config.symbol,
            balance: result.current_balance,
            current_price: result.current_price,
            market_value: result.current_balance.saturating_mul(result.current_price),
            total_yield: result.total_yield,
            overall_apy: result.overall_apy,
            avg_deposit_price: result.avg_deposit_price,
            total_invested: result.total_invested,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CombinedSummary {
    pub market_value: Decimal,
    pub total_yield: Decimal,
    pub overall_apy: f64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PositionRow {
    pub date: Option<NaiveDate>,
    pub vault: VaultId,
    pub symbol: &'static str,
    pub kind: PositionKind,
    pub amount: Decimal,
    pub price: Decimal,
    #[serde(rename = "yield")]
    pub position_yield: Decimal,
    pub days_held: f64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct WalletReport {
    pub wallet: String,
    pub generated_at: DateTime<Utc>,
    pub vaults: Vec<VaultSummary>,
    pub combined: CombinedSummary,
    pub positions: Vec<PositionRow>,
}

impl WalletReport {
    pub fn new(wallet: &str, combined: &CombinedResult, generated_at: DateTime<Utc>) -> Self {
        let vaults: Vec<VaultSummary> = VaultId::ALL
            .iter()
            .map(|vault| VaultSummary::new(*vault, combined.vault(*vault)))
            .collect();

        let positions = combined
            .sorted_positions()
            .into_iter()
            .map(|position| {
                let current_price = combined.vault(position.vault).current_price;
                PositionRow {
                    date: DateTime::from_timestamp(position.timestamp, 0).map(|ts| ts.date_naive()),
                    vault: position.vault,
                    symbol: position.vault.config().symbol,
                    kind: position.kind,
                    amount: position.amount,
                    price: position.price,
                    position_yield: position.display_yield(current_price),
                    days_held: position.days_held,
                }
            })
            .collect();

        WalletReport {
            wallet: wallet.to_string(),
            generated_at,
            combined: CombinedSummary {
                market_value: vaults.iter().map(|v| v.market_value).sum(),
                total_yield: combined.total_yield,
                overall_apy: combined.overall_apy,
            },
            vaults,
            positions,
        }
    }
}

impl IntoResponse for WalletReport {
    fn into_response(self) -> axum::response::Response {
        let body = Json(json!({
            "report": self
        }));

        (StatusCode::OK, body).into_response()
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct VaultPrice {
    pub vault: VaultId,
    pub symbol: &'static str,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    pub entries: usize,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PricesResponse {
    pub response: Vec<VaultPrice>,
}

impl From<&PriceOracle> for PricesResponse {
    fn from(oracle: &PriceOracle) -> Self {
        PricesResponse {
            response: VaultId::ALL
                .iter()
                .map(|vault| {
                    let series = oracle.series(*vault);
                    VaultPrice {
                        vault: *vault,
                        symbol: vault.config().symbol,
                        price: series.latest_price(),
                        timestamp: series.latest().map(|s| s.timestamp),
                        entries: series.len(),
                    }
                })
                .collect(),
        }
    }
}

impl IntoResponse for PricesResponse {
    fn into_response(self) -> axum::response::Response {
        let body = Json(json!({
            "prices": self
        }));

        (StatusCode::OK, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use yield_core::models::{Position, PriceSeries, PriceSnapshot};

    fn position(kind: PositionKind, vault: VaultId, timestamp: i64, price: Decimal) -> Position {
        Position {
            kind,
            amount: dec!(10),
            price,
            timestamp,
            days_held: 3.0,
            vault,
        }
    }

    fn combined() -> CombinedResult {
        let usd = VaultYieldResult {
            positions: vec![
                position(PositionKind::Deposit, VaultId::Usd, 86_400 * 2, dec!(1.0)),
                position(PositionKind::Withdrawal, VaultId::Usd, 86_400 * 3, dec!(1.1)),
            ],
            total_yield: dec!(3),
            current_balance: dec!(100),
            current_price: dec!(1.2),
            ..Default::default()
        };
        let plus = VaultYieldResult {
            positions: vec![position(PositionKind::Estimated, VaultId::Plus, 86_400, dec!(1))],
            total_yield: dec!(1),
            current_balance: dec!(10),
            current_price: dec!(1.1),
            ..Default::default()
        };
        yield_core::combine(usd, plus)
    }

    #[test]
    fn test_report_summaries() {
        let report = WalletReport::new("0xabc", &combined(), Utc::now());
        assert_eq!(report.vaults.len(), 2);
        assert_eq!(report.vaults[0].symbol, "aiUSD");
        assert_eq!(report.vaults[0].market_value, dec!(120));
        assert_eq!(report.vaults[1].market_value, dec!(11));
        assert_eq!(report.combined.market_value, dec!(131));
        assert_eq!(report.combined.total_yield, dec!(4));
    }

    #[test]
    fn test_report_rows_sorted_with_display_yield() {
        let report = WalletReport::new("0xabc", &combined(), Utc::now());
        let kinds: Vec<PositionKind> = report.positions.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![PositionKind::Estimated, PositionKind::Deposit, PositionKind::Withdrawal]
        );
        assert_eq!(report.positions[0].symbol, "alpUSD");
        assert_eq!(report.positions[0].position_yield, dec!(1));
        assert_eq!(report.positions[1].position_yield, dec!(2));
        assert_eq!(report.positions[2].position_yield, Decimal::ZERO);
        assert_eq!(report.positions[0].date, NaiveDate::from_ymd_opt(1970, 1, 2));

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["positions"][0].get("yield").is_some());
        assert_eq!(json["positions"][0]["date"], "1970-01-02");
    }

    #[test]
    fn test_prices_response() {
        let oracle = PriceOracle::new(
            PriceSeries::new(vec![PriceSnapshot::new(10, dec!(1.01))]),
            PriceSeries::default(),
        );
        let prices = PricesResponse::from(&oracle);
        assert_eq!(prices.response[0].price, dec!(1.01));
        assert_eq!(prices.response[0].timestamp, Some(10));
        assert_eq!(prices.response[1].price, Decimal::ONE);
        assert_eq!(prices.response[1].entries, 0);
    }
}
