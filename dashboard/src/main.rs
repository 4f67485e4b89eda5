use anyhow::{Context, Result, anyhow};
use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use clap::Parser;
use common::{logging, settings::SettingsReader};
use models::settings::{PriceHistoryConfig, Settings};
use serde_json::to_string;
use service::{alchemy::AlchemyClient, price_history::{PriceHistoryClient, load_oracle}};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::info;
use yield_core::oracle::PriceOracle;

mod models;
mod service;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "settings.json")]
    settings: String,

    /// Print the yield report for this wallet and exit instead of serving
    #[arg(short, long)]
    wallet: Option<String>,

    #[arg(long)]
    frontend: Option<String>,
}

pub(crate) struct AppState {
    alchemy: AlchemyClient,
    price_client: PriceHistoryClient,
    price_config: PriceHistoryConfig,
    oracle: RwLock<Arc<PriceOracle>>,
}

impl AppState {
    /// Snapshot of the price histories currently in use.
    pub(crate) async fn oracle(&self) -> Arc<PriceOracle> {
        self.oracle.read().await.clone()
    }
}

fn graceful_shutdown(shutdown_signal: &CancellationToken) {
    info!("Graceful shutdown initiated");
    shutdown_signal.cancel();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmdline_args = Args::parse();
    let settings = SettingsReader::read_config_file::<Settings>(&cmdline_args.settings)?;

    logging::init_logging(&settings.logging).context("Failed to start logging")?;

    let version = env!("CARGO_PKG_VERSION");
    info!("___/********Vault Yield Dashboard v{}********\\___", version);
    info!("Settings: {}", to_string(&settings)?);

    let alchemy = AlchemyClient::new(&settings.alchemy)?;
    let price_client = PriceHistoryClient::new()?;
    let oracle = load_oracle(&price_client, &settings.prices).await;

    let state = Arc::new(AppState {
        alchemy,
        price_client,
        price_config: settings.prices.clone(),
        oracle: RwLock::new(Arc::new(oracle)),
    });

    if let Some(wallet) = cmdline_args.wallet {
        let report = service::wallet_report(&state, wallet.trim())
            .await
            .map_err(|e| anyhow!("{e}"))?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let frontend_path = cmdline_args.frontend.unwrap_or_else(|| "frontend".to_string());
    let base_url = format!("http://{}:{}", settings.server.host, settings.server.port);

    let cors = CorsLayer::new()
        .allow_origin(base_url.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(service::health))
        .route("/wallet/{address}", get(service::wallet))
        .route("/prices", get(service::prices))
        .route("/prices/reload", post(service::reload_prices))
        .with_state(state)
        .layer(cors)
        .fallback_service(ServeDir::new(frontend_path).append_index_html_on_directories(true));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("listening on {}", listener.local_addr()?);

    let cancel_token = CancellationToken::new();
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    let shutdown = cancel_token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown.cancelled() => {}
            _ = sigterm.recv() => graceful_shutdown(&shutdown),
            _ = signal::ctrl_c() => graceful_shutdown(&shutdown),
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel_token.cancelled_owned())
        .await?;
    Ok(())
}
