use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::{balance_repo, trade_repo};
use crate::engine::sizer::{self, RiskReward};
use crate::errors::AppError;
use crate::models::{CopyDecision, Side, Trade, TradeSignal};
use crate::AppState;

/// POST /api/control/pause — stop acting on new signals.
pub async fn pause(State(state): State<AppState>) -> impl IntoResponse {
    state.pause_flag.store(true, Ordering::Relaxed);
    tracing::warn!("Copy trading PAUSED via control API");
    (StatusCode::OK, Json(json!({ "status": "paused" })))
}

/// POST /api/control/resume — resume acting on signals.
pub async fn resume(State(state): State<AppState>) -> impl IntoResponse {
    state.pause_flag.store(false, Ordering::Relaxed);
    tracing::info!("Copy trading RESUMED via control API");
    (StatusCode::OK, Json(json!({ "status": "running" })))
}

/// GET /api/control/status — current loop status.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let paused = state.pause_flag.load(Ordering::Relaxed);
    let trader = state.paper_trader.lock().await;

    Json(json!({
        "mode": "paper",
        "paused": paused,
        "balance": trader.balance(),
        "open_positions": trader.open_positions().len(),
    }))
}

#[derive(Deserialize)]
pub struct SimulateRequest {
    pub market_id: String,
    pub side: String,
    pub price: Decimal,
    /// Whale notional behind the synthetic signal; defaults to $10k.
    pub amount: Option<Decimal>,
    /// Defaults to the top-ranked whale.
    pub whale_address: Option<String>,
}

#[derive(Serialize)]
pub struct SimulateResponse {
    pub decision: CopyDecision,
    pub risk_reward: RiskReward,
    pub trade: Option<Trade>,
}

/// POST /api/simulate — push a synthetic signal through the full
/// decision-and-execution chain.
pub async fn simulate(
    State(state): State<AppState>,
    Json(req): Json<SimulateRequest>,
) -> Result<Json<SimulateResponse>, AppError> {
    let side = Side::from_api_str(&req.side)
        .ok_or_else(|| AppError::BadRequest(format!("unrecognized side {:?}", req.side)))?;

    let whale = {
        let ranker = state.ranker.lock().await;
        match &req.whale_address {
            Some(address) => ranker.get(address).cloned(),
            None => ranker.top(1).first().map(|t| (*t).clone()),
        }
    };
    let Some(whale) = whale else {
        return Err(AppError::BadRequest(
            "no tracked whale to attribute the signal to".into(),
        ));
    };

    let mut signal = TradeSignal::new(
        whale.address.clone(),
        req.market_id,
        side,
        req.amount.unwrap_or_else(|| Decimal::from(10_000)),
        req.price,
    );

    let decision = {
        let balance = state.paper_trader.lock().await.balance();
        let mut decider = state.decider.lock().await;
        decider.decide(&mut signal, &whale, balance, None, &[])
    };

    let trade = if decision.should_copy {
        let opened = {
            let mut trader = state.paper_trader.lock().await;
            trader.execute(&signal, &decision)
        };
        if let Some(trade) = &opened {
            state
                .decider
                .lock()
                .await
                .register_position(&trade.market_id, trade.id);
            if let Err(e) = trade_repo::insert_trade(&state.db, trade).await {
                tracing::error!(trade_id = %trade.id, error = %e, "Simulated trade insert failed");
            }
        }
        opened
    } else {
        None
    };

    Ok(Json(SimulateResponse {
        decision,
        risk_reward: sizer::risk_reward(signal.price, side),
        trade,
    }))
}

/// POST /api/reset — wipe the paper book and start over at the
/// configured initial balance.
pub async fn reset(State(state): State<AppState>) -> impl IntoResponse {
    let open_markets: Vec<String> = {
        let trader = state.paper_trader.lock().await;
        trader
            .open_positions()
            .iter()
            .map(|t| t.market_id.clone())
            .collect()
    };

    {
        let mut trader = state.paper_trader.lock().await;
        trader.reset();
    }
    {
        let mut decider = state.decider.lock().await;
        for market_id in &open_markets {
            decider.close_position(market_id);
        }
        decider.clear_cooldowns();
    }

    if let Err(e) = trade_repo::delete_all(&state.db, true).await {
        tracing::error!(error = %e, "Trade wipe failed during reset");
    }
    if let Err(e) = balance_repo::delete_all(&state.db, true).await {
        tracing::error!(error = %e, "Balance history wipe failed during reset");
    }

    tracing::warn!("Paper trading state RESET via control API");
    (StatusCode::OK, Json(json!({ "status": "reset" })))
}
