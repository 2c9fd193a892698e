//! # error
//!
//! Error types for the panel and its HTTP host.
//!
//! * [`ValidationError`] — local input problems, surfaced as an alert.
//! * [`TransportError`] — the analysis call itself failed; rendered as a
//!   generic message, the cause only goes to the logs.
//! * [`AppError`] — what Axum handlers return.  Its `IntoResponse` impl keeps
//!   the `{ "ok": false, "error": .. }` body shape for every failure.
//!
//! An `error` field inside a successfully decoded body is not an `Err` at
//! all: it is a normal [`crate::models::AnalysisResponse::Failure`] that the
//! panel renders.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Ticker (after trimming) or capital was empty.
    #[error("Please enter both ticker and capital")]
    MissingInput,
}

#[derive(Debug, Error)]
pub enum TransportError {
    /// Request rejected, connection refused, DNS failure, timeout...
    #[error("analysis request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The body arrived but is not JSON of either response shape.
    #[error("analysis response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Catch-all for unexpected failures.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            AppError::Internal(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal error: {err}"),
            ),
        };

        let body = Json(json!({
            "ok":    false,
            "error": message,
        }));

        (status, body).into_response()
    }
}
