use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::require_auth;
use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes — no authentication required
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    // Protected API routes — require Bearer token when API_TOKEN is set
    let protected = Router::new()
        // Dashboard
        .route("/api/status", get(handlers::dashboard::status))
        .route("/api/balance-history", get(handlers::dashboard::balance_history))
        // Whales
        .route("/api/whales", get(handlers::whales::list))
        .route("/api/whales/:address", get(handlers::whales::detail))
        .route("/api/refresh-whales", post(handlers::whales::refresh))
        // Trades
        .route("/api/trades", get(handlers::trades::list))
        .route("/api/trades/open", get(handlers::trades::open))
        .route("/api/markets/:market_id/consensus", get(handlers::trades::consensus))
        // Control
        .route("/api/control/pause", post(handlers::control::pause))
        .route("/api/control/resume", post(handlers::control::resume))
        .route("/api/control/status", get(handlers::control::status))
        .route("/api/simulate", post(handlers::control::simulate))
        .route("/api/reset", post(handlers::control::reset))
        // WebSocket
        .route("/ws", get(handlers::ws::handler))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // CORS: allow same-origin + common dashboard origins
    let cors = CorsLayer::new()
        .allow_origin(Any) // nginx proxies from same origin; direct API access needs token
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
