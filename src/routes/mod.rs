//! HTTP surface of the panel host.

pub mod page;
pub mod panel;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::SharedState;

/// All routes, without middleware.  `main` adds CORS and tracing layers.
pub fn router(state: SharedState) -> Router {
    Router::new()
        // ── Host page ─────────────────────────────────────────────────────────
        .route("/",                   get(page::index))
        .route("/api/health",         get(page::health_check))
        // ── Request panel ─────────────────────────────────────────────────────
        .route("/api/panel/analyze",  post(panel::analyze))
        .route("/api/panel/result",   get(panel::get_result))
        .route("/api/panel/state",    get(panel::get_state))
        .route("/api/panel/events",   get(panel::stream_events))
        .with_state(state)
}
