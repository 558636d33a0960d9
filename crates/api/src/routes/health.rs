use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether both the data and upload directories accept writes.
    pub storage_writable: bool,
}

/// GET /health -- returns service and storage health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let data_ok = rioframe_db::health_check(&state.config.data_dir).await;
    let uploads_ok = rioframe_db::health_check(&state.config.uploads_dir).await;

    if let Err(e) = data_ok.as_ref().and(uploads_ok.as_ref()) {
        tracing::warn!(error = %e, "Storage health check failed");
    }
    let storage_writable = data_ok.is_ok() && uploads_ok.is_ok();

    Json(HealthResponse {
        status: if storage_writable { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        storage_writable,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
