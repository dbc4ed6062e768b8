use crate::{types::HealthResponse, AppState};
use axum::{extract::State, Json};

/// Liveness probe; reports the crate version and the configured model.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.llm.model_name().to_string(),
    })
}
