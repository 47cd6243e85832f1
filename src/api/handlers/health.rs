use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::AppState;

/// Liveness probe. Reports degraded when Postgres is unreachable; the scan
/// and resolution loops keep running on in-memory state either way.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_up = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();

    let status = if db_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = json!({
        "status": if db_up { "ok" } else { "degraded" },
        "service": "copybot",
        "database": if db_up { "up" } else { "down" },
    });

    (status, Json(body))
}
