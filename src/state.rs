//! # state
//!
//! Shared application state handed to every Axum handler.
//!
//! * `form` is the server-side copy of the two input fields.
//! * `panel` owns the transport and writes the result region.
//! * `region` is the same `Arc` the panel writes, kept here so read-only
//!   handlers do not need to go through the panel.

use std::sync::Arc;

use crate::config::Config;
use crate::panel::{FormFields, PanelOptions, RequestPanel, ResultRegion};
use crate::transport::{AnalysisTransport, HttpTransport};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub form:   Arc<FormFields>,
    pub region: Arc<ResultRegion>,
    pub panel:  Arc<RequestPanel>,
}

impl AppState {
    /// Wire the panel to an arbitrary transport (tests use fakes).
    pub fn with_transport(config: Config, transport: Arc<dyn AnalysisTransport>) -> Self {
        let form = Arc::new(FormFields::new(&config.default_ticker, &config.default_capital));
        let region = Arc::new(ResultRegion::new());

        let panel = RequestPanel::new(
            form.clone(),
            transport,
            region.clone(),
            PanelOptions {
                default_currency: config.default_currency.clone(),
                stale_responses:  config.stale_responses,
            },
        );

        Self {
            config: Arc::new(config),
            form,
            region,
            panel: Arc::new(panel),
        }
    }
}

/// Convenience type alias
pub type SharedState = Arc<AppState>;

/// Production wiring: one shared `reqwest::Client` for every trigger.
pub fn build_state(config: Config) -> SharedState {
    let transport = HttpTransport::new(reqwest::Client::new(), config.analysis_url.clone())
        .with_timeout(config.request_timeout);

    Arc::new(AppState::with_transport(config, Arc::new(transport)))
}
