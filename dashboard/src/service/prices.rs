use axum::{extract::State, response::IntoResponse};
use std::sync::Arc;
use tracing::info;

use crate::{AppState, models::report::PricesResponse};

use super::price_history::load_oracle;

pub(crate) async fn prices(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let oracle = state.oracle().await;
    PricesResponse::from(oracle.as_ref()).into_response()
}

/// Reloads both price histories and swaps them in for subsequent queries.
pub(crate) async fn reload_prices(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let oracle = Arc::new(load_oracle(&state.price_client, &state.price_config).await);
    *state.oracle.write().await = oracle.clone();
    info!("Price history reloaded");
    PricesResponse::from(oracle.as_ref()).into_response()
}
