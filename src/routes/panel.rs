//! # routes::panel
//!
//! Axum route handlers for the request panel.
//!
//! | Method | Path                  | Description                                    |
//! |--------|-----------------------|------------------------------------------------|
//! | POST   | `/api/panel/analyze`  | Store the form values and trigger the panel    |
//! | GET    | `/api/panel/result`   | Current result region HTML                     |
//! | GET    | `/api/panel/state`    | JSON snapshot of the panel                     |
//! | GET    | `/api/panel/events`   | SSE stream of result region changes            |

use std::convert::Infallible;

use axum::{
    extract::State,
    http::HeaderValue,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse,
    },
    Form, Json,
};
use futures_util::stream::{self, Stream};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{error::AppError, state::SharedState};

/// Header carrying the trigger token on `/api/panel/analyze` responses.
pub const TOKEN_HEADER: &str = "x-panel-token";

/// Missing fields arrive as empty strings and fail validation in the panel.
#[derive(Debug, Deserialize)]
pub struct AnalyzeForm {
    #[serde(default)]
    pub ticker:  String,
    #[serde(default)]
    pub capital: String,
}

// ─── POST /api/panel/analyze ──────────────────────────────────────────────────

/// The analyse button.  Returns the fragment this trigger produced; if a
/// newer trigger already owns the region the fragment is still returned but
/// the region is left alone.
pub async fn analyze(
    State(state): State<SharedState>,
    Form(form): Form<AnalyzeForm>,
) -> Result<impl IntoResponse, AppError> {
    let request_id = Uuid::new_v4();
    info!(%request_id, ticker = %form.ticker, "[HTTP] Analyse requested");

    state.form.set(&form.ticker, &form.capital);
    let done = state.panel.trigger().await?;

    info!(%request_id, token = done.token, applied = done.applied, "[HTTP] Analyse finished");

    let html = done.view.to_html(&state.config.default_currency);
    let mut response = Html(html).into_response();
    response
        .headers_mut()
        .insert(TOKEN_HEADER, HeaderValue::from(done.token));

    Ok(response)
}

// ─── GET /api/panel/result ────────────────────────────────────────────────────

pub async fn get_result(State(state): State<SharedState>) -> Html<String> {
    Html(state.region.html())
}

// ─── GET /api/panel/state ─────────────────────────────────────────────────────

pub async fn get_state(State(state): State<SharedState>) -> impl IntoResponse {
    let snapshot = state.panel.snapshot();
    Json(json!({ "ok": true, "panel": snapshot }))
}

// ─── GET /api/panel/events ────────────────────────────────────────────────────

/// Current region content first, then one `result` event per change.
pub async fn stream_events(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.region.subscribe();

    let events = stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let html = rx.borrow_and_update().clone();
        Some((Ok::<_, Infallible>(Event::default().event("result").data(html)), (rx, false)))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::TransportError;
    use crate::models::{AnalysisRequest, AnalysisResponse};
    use crate::routes::router;
    use crate::state::AppState;
    use crate::transport::AnalysisTransport;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use futures_util::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    struct CannedTransport {
        body:  &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AnalysisTransport for CannedTransport {
        async fn fetch(&self, _request: &AnalysisRequest) -> Result<AnalysisResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AnalysisResponse::from_json(self.body)?)
        }
    }

    fn app(body: &'static str) -> (Router, Arc<CannedTransport>, SharedState) {
        let transport = Arc::new(CannedTransport { body, calls: AtomicUsize::new(0) });
        let state = Arc::new(AppState::with_transport(Config::default(), transport.clone()));
        (router(state.clone()), transport, state)
    }

    fn analyze_request(form: &str) -> Request<Body> {
        Request::post("/api/panel/analyze")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    const VOD_L: &str = r#"{"ticker":"VOD.L","signal":"BUY","reason":"RSI oversold","trend":"up",
        "price":95.2,"rsi":28.4,"position_size":200,"risk_per_trade":20,"stop_price":90.1,"currency":"£"}"#;

    #[tokio::test]
    async fn test_analyze_renders_report() {
        let (app, transport, state) = app(VOD_L);

        let response = app.oneshot(analyze_request("ticker=VOD.L&capital=1000")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[TOKEN_HEADER], "1");
        let html = body_text(response).await;
        assert!(html.contains("£95.2"));
        assert!(html.contains("£90.1"));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.region.html(), html);
    }

    #[tokio::test]
    async fn test_analyze_with_missing_capital_is_an_alert() {
        let (app, transport, _state) = app(VOD_L);

        let response = app.oneshot(analyze_request("ticker=VOD.L")).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Please enter both ticker and capital");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_service_error_is_rendered() {
        let (app, _transport, _state) = app(r#"{"error":"Ticker not found"}"#);

        let response = app.oneshot(analyze_request("ticker=NOPE&capital=10")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Ticker not found"));
        assert!(!html.contains("RSI:"));
        assert!(!html.contains("Price:"));
    }

    #[tokio::test]
    async fn test_result_and_state_follow_the_last_trigger() {
        let (app, _transport, _state) = app(VOD_L);

        app.clone().oneshot(analyze_request("ticker=VOD.L&capital=1000")).await.unwrap();

        let result = app
            .clone()
            .oneshot(Request::get("/api/panel/result").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(body_text(result).await.contains("<strong>Signal:</strong> BUY"));

        let snapshot = app
            .oneshot(Request::get("/api/panel/state").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&body_text(snapshot).await).unwrap();
        assert_eq!(body["panel"]["state"], "report");
        assert_eq!(body["panel"]["token"], 1);
    }

    #[tokio::test]
    async fn test_state_starts_idle() {
        let (app, _transport, _state) = app(VOD_L);

        let response = app
            .oneshot(Request::get("/api/panel/state").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["panel"]["state"], "idle");
        assert_eq!(body["panel"]["html"], "");
    }

    /// Read SSE frames into `seen` until it contains `needle`.
    async fn read_until<S>(frames: &mut S, seen: &mut String, needle: &str)
    where
        S: futures_util::Stream<Item = Result<axum::body::Bytes, axum::Error>> + Unpin,
    {
        while !seen.contains(needle) {
            let chunk = tokio::time::timeout(Duration::from_secs(5), frames.next())
                .await
                .unwrap_or_else(|_| panic!("no '{needle}' within 5s, got {seen:?}"))
                .expect("event stream ended")
                .unwrap();
            seen.push_str(&String::from_utf8_lossy(&chunk));
        }
    }

    #[tokio::test]
    async fn test_events_stream_current_region_then_changes() {
        let (app, _transport, state) = app(VOD_L);
        state.region.replace("Loading...".into());

        let response = app
            .oneshot(Request::get("/api/panel/events").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream"));

        let mut frames = Box::pin(response.into_body().into_data_stream());
        let mut seen = String::new();

        read_until(&mut frames, &mut seen, "data: Loading...").await;
        assert!(seen.contains("event: result"));

        state.region.replace("<strong>Signal:</strong> BUY".into());
        read_until(&mut frames, &mut seen, "data: <strong>Signal:</strong> BUY").await;
    }
}
