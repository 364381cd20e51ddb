pub mod api;
pub mod web;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::models::now_iso;
use crate::AppState;

/// Load-balancer health check: healthy only when the table is describable.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "dynamodb": "connected",
                "timestamp": now_iso(),
            })),
        ),
        Err(err) => {
            error!(error = %err, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy", "error": err.to_string() })),
            )
        }
    }
}
