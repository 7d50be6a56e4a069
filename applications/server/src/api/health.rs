/// Health check API routes
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

/// GET /api/health - liveness plus a database ping
pub async fn health(State(app_state): State<AppState>) -> Json<HealthResponse> {
    let database = match sqlx::query("SELECT 1").execute(&app_state.pool).await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!("Health check database ping failed: {}", e);
            "unavailable"
        }
    };

    Json(HealthResponse {
        status: "ok",
        database,
        version: env!("CARGO_PKG_VERSION"),
    })
}
