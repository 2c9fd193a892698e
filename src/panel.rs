//! # panel
//!
//! The **RequestPanel** — read two fields, call the analysis service once,
//! put the outcome into the result region.
//!
//! ## States
//!
//! ```text
//!            trigger()                    fetch resolves
//!  Idle ───────────────▶ Loading ──┬──────────────────────▶ Report
//!                                   ├── body has `error` ──▶ Rejected
//!                                   └── transport/decode ──▶ Unavailable
//! ```
//!
//! Every trigger is independent: no cancellation, no de-duplication.  Each
//! trigger takes a token from a monotonically increasing counter.  With
//! [`StalePolicy::Discard`] a completion is written only if its token is
//! still the newest; with [`StalePolicy::Overwrite`] the last completion to
//! resolve wins.
//!
//! The token check and the region write happen under one `std::sync::Mutex`
//! that is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::ValidationError;
use crate::models::{AnalysisReport, AnalysisRequest, AnalysisResponse};
use crate::render;
use crate::transport::AnalysisTransport;

// ─── Inputs ───────────────────────────────────────────────────────────────────

/// The two input "elements" the panel reads at trigger time.
pub trait FormInputs: Send + Sync {
    /// `(ticker, capital)` as currently entered, read together.
    fn values(&self) -> (String, String);
}

/// Server-side form state.  The host writes whatever the user submitted;
/// the panel reads it back when triggered.  Both fields sit behind one lock
/// so a reader never sees the ticker of one submission with the capital of
/// another.
#[derive(Debug, Default)]
pub struct FormFields {
    values: RwLock<(String, String)>,
}

impl FormFields {
    pub fn new(ticker: impl Into<String>, capital: impl Into<String>) -> Self {
        Self { values: RwLock::new((ticker.into(), capital.into())) }
    }

    pub fn set(&self, ticker: &str, capital: &str) {
        *self.values.write().unwrap_or_else(PoisonError::into_inner) =
            (ticker.to_string(), capital.to_string());
    }
}

impl FormInputs for FormFields {
    fn values(&self) -> (String, String) {
        self.values.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

// ─── Result Region ────────────────────────────────────────────────────────────

/// The designated display region: one HTML string, replaced wholesale.
///
/// Backed by a `watch` channel so the host can stream every change.
#[derive(Debug)]
pub struct ResultRegion {
    tx: watch::Sender<String>,
}

impl ResultRegion {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(String::new());
        Self { tx }
    }

    pub fn replace(&self, html: String) {
        self.tx.send_replace(html);
    }

    pub fn html(&self) -> String {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for ResultRegion {
    fn default() -> Self {
        Self::new()
    }
}

// ─── View ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StalePolicy {
    /// Drop completions whose token is no longer the newest.
    Discard,
    /// Last completion to resolve wins.
    Overwrite,
}

/// What the region currently represents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PanelView {
    Idle,
    Loading,
    Report { report: AnalysisReport },
    /// The service answered with an `error` field.
    Rejected { message: String },
    /// Transport or decode failure.
    Unavailable,
}

impl PanelView {
    pub fn to_html(&self, default_currency: &str) -> String {
        match self {
            PanelView::Idle => String::new(),
            PanelView::Loading => render::loading(),
            PanelView::Report { report } => render::report(report, default_currency),
            PanelView::Rejected { message } => render::rejected(message),
            PanelView::Unavailable => render::unavailable(),
        }
    }

    fn from_fetch(
        token: u64,
        ticker: &str,
        outcome: Result<AnalysisResponse, crate::error::TransportError>,
    ) -> Self {
        match outcome {
            Ok(AnalysisResponse::Report(report)) => {
                info!(token, ticker, signal = %report.signal, "📈 [PANEL] Analysis received");
                PanelView::Report { report }
            }
            Ok(AnalysisResponse::Failure(failure)) => {
                warn!(token, ticker, error = %failure.error, "[PANEL] Service reported an error");
                PanelView::Rejected { message: failure.error }
            }
            Err(e) => {
                error!(token, ticker, error = %e, "❌ [PANEL] Error fetching data");
                PanelView::Unavailable
            }
        }
    }
}

/// Mirror of the region plus the bookkeeping behind it.
#[derive(Debug, Clone, Serialize)]
pub struct PanelSnapshot {
    /// Token of the trigger that produced `view` (0 = never triggered).
    pub token:      u64,
    #[serde(flatten)]
    pub view:       PanelView,
    pub html:       String,
    pub updated_at: DateTime<Utc>,
}

/// Result of one trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub token:   u64,
    pub view:    PanelView,
    /// `false` when a newer trigger owned the region and this view was dropped.
    pub applied: bool,
}

#[derive(Debug, Clone)]
pub struct PanelOptions {
    pub default_currency: String,
    pub stale_responses:  StalePolicy,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            default_currency: "£".to_string(),
            stale_responses:  StalePolicy::Discard,
        }
    }
}

// ─── RequestPanel ─────────────────────────────────────────────────────────────

struct PanelInner {
    /// Newest token handed out.
    latest:   u64,
    snapshot: PanelSnapshot,
}

pub struct RequestPanel {
    inputs:    Arc<dyn FormInputs>,
    transport: Arc<dyn AnalysisTransport>,
    region:    Arc<ResultRegion>,
    options:   PanelOptions,
    inner:     Mutex<PanelInner>,
}

impl RequestPanel {
    pub fn new(
        inputs: Arc<dyn FormInputs>,
        transport: Arc<dyn AnalysisTransport>,
        region: Arc<ResultRegion>,
        options: PanelOptions,
    ) -> Self {
        let snapshot = PanelSnapshot {
            token:      0,
            view:       PanelView::Idle,
            html:       region.html(),
            updated_at: Utc::now(),
        };

        Self {
            inputs,
            transport,
            region,
            options,
            inner: Mutex::new(PanelInner { latest: 0, snapshot }),
        }
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        self.lock().snapshot.clone()
    }

    /// Handle one activation of the analyse button.
    ///
    /// Empty inputs return `Err` before the region is touched and before any
    /// network call.  Everything after that is rendered, never returned as
    /// an error.
    pub async fn trigger(&self) -> Result<Completion, ValidationError> {
        let (ticker, capital) = self.inputs.values();
        let request = AnalysisRequest::from_inputs(&ticker, &capital)
            .inspect_err(|e| warn!(error = %e, "[PANEL] Trigger rejected"))?;

        let token = self.begin();

        info!(
            token,
            ticker  = %request.ticker,
            capital = %request.capital,
            "🔎 [PANEL] Requesting analysis"
        );

        let outcome = self.transport.fetch(&request).await;
        let view = PanelView::from_fetch(token, &request.ticker, outcome);
        let applied = self.finish(token, &view);

        Ok(Completion { token, view, applied })
    }

    /// Take a new token and show `Loading...`.
    fn begin(&self) -> u64 {
        let mut inner = self.lock();
        inner.latest += 1;
        let token = inner.latest;
        self.write(&mut inner, token, PanelView::Loading);
        token
    }

    fn finish(&self, token: u64, view: &PanelView) -> bool {
        let mut inner = self.lock();

        if self.options.stale_responses == StalePolicy::Discard && token != inner.latest {
            debug!(token, latest = inner.latest, "[PANEL] Stale response discarded");
            return false;
        }

        self.write(&mut inner, token, view.clone());
        true
    }

    fn write(&self, inner: &mut PanelInner, token: u64, view: PanelView) {
        let html = view.to_html(&self.options.default_currency);
        self.region.replace(html.clone());
        inner.snapshot = PanelSnapshot { token, view, html, updated_at: Utc::now() };
    }

    fn lock(&self) -> MutexGuard<'_, PanelInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
