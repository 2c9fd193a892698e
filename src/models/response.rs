//! # models::response
//!
//! What the analysis service sends back: either `{ "error": "..." }` or the
//! full report.  The service computes every number; we only carry them.

use serde::{Deserialize, Serialize};

/// Decoded body of `GET /analyze`.
///
/// `Failure` is listed first so that any body carrying a string `error`
/// field is a failure, whatever else it contains.  `"error": null` does not
/// match `Failure` and falls through to `Report`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AnalysisResponse {
    Failure(AnalysisFailure),
    Report(AnalysisReport),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisFailure {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub ticker:         String,
    /// `BUY` | `SELL` | `HOLD`
    pub signal:         String,
    pub reason:         String,
    /// `Bullish` | `Bearish`
    pub trend:          String,
    pub price:          f64,
    pub rsi:            f64,
    pub position_size:  f64,
    pub risk_per_trade: f64,
    pub stop_price:     f64,
    /// Symbol such as `£` or `$`; absent on older deployments.
    #[serde(default)]
    pub currency:       Option<String>,
}

impl AnalysisResponse {
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }
}
