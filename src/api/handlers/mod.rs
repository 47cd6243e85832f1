pub mod control;
pub mod dashboard;
pub mod health;
pub mod metrics;
pub mod trades;
pub mod whales;
pub mod ws;

use serde::Serialize;

/// Uniform JSON envelope for API list/detail endpoints.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}
