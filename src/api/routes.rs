use crate::api::handlers::{chat, health};
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Method and full path of every endpoint, for startup listings.
pub const ROUTES: [(&str, &str); 3] = [
    ("POST", "/api/agent/chat"),
    ("POST", "/api/retail/chat"),
    ("GET", "/api/health"),
];

/// Routes mounted under `/api`.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/agent/chat", post(chat::agent_chat))
        .route("/retail/chat", post(chat::retail_chat))
        .route("/health", get(health::health_check))
}

/// The full application: API routes plus tracing, CORS and body-size layers.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest("/api", create_router())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
