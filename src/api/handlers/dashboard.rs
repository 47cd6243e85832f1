use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::brain::RankingsSummary;
use crate::db::balance_repo;
use crate::errors::AppError;
use crate::engine::TradingSummary;
use crate::models::BalanceSample;
use crate::AppState;

use super::ApiResponse;

#[derive(Serialize)]
pub struct StatusResponse {
    pub paused: bool,
    pub trading: TradingSummary,
    pub whales: RankingsSummary,
}

/// GET /api/status — trading summary plus whale-tracking summary.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let trading = state.paper_trader.lock().await.summary();
    let whales = state.ranker.lock().await.summary();

    Json(StatusResponse {
        paused: state.pause_flag.load(Ordering::Relaxed),
        trading,
        whales,
    })
}

/// GET /api/balance-history — persisted balance curve, oldest first.
pub async fn balance_history(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BalanceSample>>>, AppError> {
    let samples = balance_repo::recent_samples(&state.db, true, 500).await?;
    Ok(Json(ApiResponse::ok(samples)))
}
