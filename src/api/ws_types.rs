use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::TradingSummary;
use crate::models::Trade;

/// Messages broadcast to all connected WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    #[serde(rename = "trade_opened")]
    TradeOpened(Trade),

    #[serde(rename = "trade_closed")]
    TradeClosed(Trade),

    #[serde(rename = "status_update")]
    StatusUpdate(TradingSummary),

    #[serde(rename = "scanning")]
    Scanning(ScanInfo),
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanInfo {
    pub whales_scanned: usize,
    pub signals_found: usize,
    pub timestamp: DateTime<Utc>,
}
