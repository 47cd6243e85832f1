use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::brain::{CopyDecider, MarketConsensus};
use crate::db::trade_repo;
use crate::errors::AppError;
use crate::models::Trade;
use crate::AppState;

use super::ApiResponse;

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/trades — persisted trade history, newest first.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<Trade>>>, AppError> {
    let trades = trade_repo::recent_trades(&state.db, true, params.limit.clamp(1, 500)).await?;
    Ok(Json(ApiResponse::ok(trades)))
}

/// GET /api/trades/open — live open positions from the paper trader.
pub async fn open(State(state): State<AppState>) -> Json<ApiResponse<Vec<Trade>>> {
    let trader = state.paper_trader.lock().await;
    let positions: Vec<Trade> = trader.open_positions().into_iter().cloned().collect();
    Json(ApiResponse::ok(positions))
}

/// GET /api/markets/:market_id/consensus — whale agreement on one market,
/// computed over the current scan window's signals.
pub async fn consensus(
    State(state): State<AppState>,
    Path(market_id): Path<String>,
) -> Json<ApiResponse<MarketConsensus>> {
    // Open positions are the only signals retained between scans; consensus
    // over them shows what the book currently believes.
    let trader = state.paper_trader.lock().await;
    let signals: Vec<_> = trader
        .open_positions()
        .iter()
        .map(|t| {
            let mut s = crate::models::TradeSignal::new(
                t.whale_address.clone(),
                t.market_id.clone(),
                t.side,
                t.amount,
                t.entry_price,
            );
            s.whale_name = t.whale_name.clone();
            s
        })
        .collect();

    Json(ApiResponse::ok(CopyDecider::consensus_for_market(
        &market_id, &signals,
    )))
}
