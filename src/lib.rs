pub mod api;
pub mod brain;
pub mod config;
pub mod db;
pub mod engine;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod polymarket;
pub mod services;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use crate::api::ws_types::WsMessage;
use crate::brain::{CopyDecider, TraderRanker};
use crate::config::AppConfig;
use crate::engine::PaperTrader;
use crate::polymarket::DataClient;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: AppConfig,
    pub ws_tx: broadcast::Sender<WsMessage>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    pub data_client: DataClient,

    // Core engine state, shared between the monitor loop and the API.
    pub ranker: Arc<Mutex<TraderRanker>>,
    pub decider: Arc<Mutex<CopyDecider>>,
    pub paper_trader: Arc<Mutex<PaperTrader>>,
    pub pause_flag: Arc<AtomicBool>,
}
