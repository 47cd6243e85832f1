use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::errors::AppError;
use crate::AppState;

/// Bearer-token gate for the `/api` routes.
///
/// The expected token comes from `AppConfig::api_token` (the `API_TOKEN`
/// env var). When it is unset or empty the gate is open, which is the
/// local-dev default; `/health` and `/metrics` never pass through here.
pub async fn require_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config.api_token.as_deref().filter(|t| !t.is_empty()) else {
        return Ok(next.run(req).await);
    };

    let presented = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);

    match presented {
        Some(token) if token == expected => Ok(next.run(req).await),
        _ => Err(AppError::Unauthorized),
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token("Bearer s3cret"), Some("s3cret"));
        assert_eq!(bearer_token("bearer s3cret"), None);
        assert_eq!(bearer_token("Basic dXNlcg=="), None);
        assert_eq!(bearer_token("s3cret"), None);
        assert_eq!(bearer_token("Bearer "), Some(""));
    }
}
