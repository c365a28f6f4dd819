// Health endpoints

use crate::{api::routes::AppState, db};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// GET /health/live
pub async fn liveness() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// GET /health/ready — verifies database connectivity
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match db::health_check(&state.db_pool).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(e) => {
            tracing::error!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
