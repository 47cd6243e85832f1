use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use copybot::api::router::create_router;
use copybot::api::ws_types::WsMessage;
use copybot::brain::{CopyDecider, DeciderConfig, TraderRanker};
use copybot::config::AppConfig;
use copybot::engine::PaperTrader;
use copybot::polymarket::DataClient;
use copybot::services::{monitor, resolution};
use copybot::{db, metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Connecting to database...");
    let pool = db::init_pool(&config.database_url).await?;
    db::ensure_schema(&pool).await?;
    tracing::info!("Database connected");

    let metrics_handle = metrics::init_metrics();

    let decider_config = DeciderConfig {
        min_whale_score: config.min_whale_score,
        max_trade_percent: config.max_trade_percent,
        cooldown_minutes: config.cooldown_minutes,
    };

    let (ws_tx, _) = broadcast::channel::<WsMessage>(256);

    let state = AppState {
        db: pool,
        config: config.clone(),
        ws_tx,
        metrics_handle,
        data_client: DataClient::new(reqwest::Client::new()),
        ranker: Arc::new(Mutex::new(TraderRanker::new())),
        decider: Arc::new(Mutex::new(CopyDecider::new(decider_config))),
        paper_trader: Arc::new(Mutex::new(PaperTrader::new(config.paper_initial_balance))),
        pause_flag: Arc::new(AtomicBool::new(false)),
    };

    // Recover balance and open positions from the last run.
    monitor::hydrate_state(&state).await?;

    // Seed the whale set before the first scan; a feed outage at boot is
    // survivable because the hourly refresher retries.
    if let Err(e) = monitor::refresh_whales(&state).await {
        tracing::warn!(error = %e, "Initial whale refresh failed; continuing with restored set");
    }

    tokio::spawn(monitor::run_whale_monitor(state.clone()));
    tokio::spawn(monitor::run_whale_refresher(state.clone()));
    tokio::spawn(resolution::run_resolution_poller(state.clone()));
    tracing::info!(
        refresh_secs = state.config.refresh_interval_secs,
        max_whales = state.config.max_whales,
        "Whale monitor spawned"
    );

    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
