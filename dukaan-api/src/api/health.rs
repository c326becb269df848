//! Service identification and health check endpoints

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum::extract::State;
use serde_json::json;
use tracing::error;

use crate::AppState;

/// GET /
///
/// Service identification; no authentication.
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "module": "dukaan-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health
///
/// Liveness plus a database ping; no authentication. An unreachable
/// database reports unhealthy with a 500.
pub async fn health_check(State(state): State<AppState>) -> Response {
    match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "module": "dukaan-api",
                "version": env!("CARGO_PKG_VERSION"),
            })),
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Health check database ping failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "unhealthy",
                    "db": "disconnected",
                })),
            )
                .into_response()
        }
    }
}
