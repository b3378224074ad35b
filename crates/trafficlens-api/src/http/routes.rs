//! HTTP route definitions.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::http::{handlers, monitoring};
use crate::service::CommandHandle;
use crate::state::AppState;

/// State shared by every route.
pub struct HttpState {
    pub app: Arc<AppState>,
    pub commands: CommandHandle,
}

impl HttpState {
    pub fn new(app: Arc<AppState>, commands: CommandHandle) -> Self {
        Self { app, commands }
    }
}

/// Create the router.
///
/// ```text
/// POST /api/command        - Execute one tagged command
/// GET  /api/tabs/{tab_id}  - Snapshot of one tab session
/// GET  /api/tabs/{tab_id}/next - Long-poll for the tab's next change
/// GET  /api/tracking       - Tracking log for ?origin=
/// GET  /health             - Component health
/// GET  /livez              - Liveness probe
/// ```
pub fn create_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/api/command", post(handlers::command))
        .route("/api/tabs/{tab_id}", get(handlers::tab_snapshot))
        .route("/api/tabs/{tab_id}/next", get(handlers::next_tab_change))
        .route("/api/tracking", get(handlers::tracking_log))
        .route("/health", get(monitoring::health_check))
        .route("/livez", get(monitoring::liveness_probe))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
