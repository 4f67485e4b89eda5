use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};
use yield_core::analyze_wallet;

use crate::{AppState, models::report::WalletReport};

use super::common::{AppError, is_valid_address};

pub(crate) async fn wallet(
    Path(address): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    match wallet_report(&state, address.trim()).await {
        Ok(report) => report.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Fetches the wallet's balances and transfers and runs the yield analysis.
pub(crate) async fn wallet_report(state: &AppState, address: &str) -> Result<WalletReport, AppError> {
    if !is_valid_address(address) {
        return Err(AppError::InvalidAddress(address.to_string()));
    }

    let balances = state
        .alchemy
        .token_balances(address)
        .await
        .map_err(AppError::UpstreamError)?;

    // a missing history is analysed as a balance with no transfers
    let transfers = match state.alchemy.asset_transfers(address).await {
        Ok(transfers) => transfers,
        Err(e) => {
            error!("Error fetching transaction history for {address}: {e:#}");
            Vec::new()
        }
    };

    let oracle = state.oracle().await;
    let now = Utc::now();
    let combined = analyze_wallet(&transfers, balances, &oracle, now.timestamp());

    info!(
        "Wallet {address}: usd_yield={} plus_yield={} total_yield={} apy={:.4}",
        combined.usd.total_yield, combined.plus.total_yield, combined.total_yield, combined.overall_apy
    );

    Ok(WalletReport::new(address, &combined, now))
}
