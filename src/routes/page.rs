//! # routes::page
//!
//! Host page and liveness check.

use axum::{extract::State, response::Html, Json};
use serde_json::json;

use crate::{panel::FormInputs, render, state::SharedState};

/// `GET /` — the form, the button and the result region.
pub async fn index(State(state): State<SharedState>) -> Html<String> {
    let (ticker, capital) = state.form.values();
    Html(render::index_page(&ticker, &capital, &state.region.html()))
}

/// `GET /api/health`
pub async fn health_check(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(json!({
        "ok":           true,
        "service":      "isa-signal-panel",
        "analysis_url": state.config.analysis_url,
    }))
}
