use axum::extract::{Path, State};
use axum::Json;

use crate::brain::LeaderboardEntry;
use crate::errors::AppError;
use crate::models::Trader;
use crate::services::monitor;
use crate::AppState;

use super::ApiResponse;

/// GET /api/whales — current leaderboard, best score first.
pub async fn list(State(state): State<AppState>) -> Json<ApiResponse<Vec<LeaderboardEntry>>> {
    let ranker = state.ranker.lock().await;
    Json(ApiResponse::ok(ranker.export_leaderboard()))
}

/// GET /api/whales/:address — full tracked record for one whale.
pub async fn detail(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<Trader>>, AppError> {
    let ranker = state.ranker.lock().await;
    match ranker.get(&address) {
        Some(trader) => Ok(Json(ApiResponse::ok(trader.clone()))),
        None => Err(AppError::NotFound(format!("whale {address} is not tracked"))),
    }
}

/// POST /api/refresh-whales — force a leaderboard pull.
pub async fn refresh(State(state): State<AppState>) -> Result<Json<ApiResponse<usize>>, AppError> {
    let count = monitor::refresh_whales(&state).await?;
    Ok(Json(ApiResponse::ok(count)))
}
