use axum::http::StatusCode;

pub(crate) mod alchemy;
pub(crate) mod common;
pub(crate) mod price_history;
mod prices;
mod wallet;

pub(crate) use prices::{prices, reload_prices};
pub(crate) use wallet::{wallet, wallet_report};

pub(crate) async fn health() -> StatusCode {
    StatusCode::OK
}
