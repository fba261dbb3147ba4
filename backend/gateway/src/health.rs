//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct ApiStatus {
    pub message: &'static str,
}

/// Handler for `GET /api`
pub async fn api_status() -> Json<ApiStatus> {
    Json(ApiStatus {
        message: "Backend API is running",
    })
}
