//! # models::request
//!
//! [`AnalysisRequest`] — the two form values, checked once at trigger time.

use crate::error::ValidationError;

/// A validated ticker/capital pair, ready to be sent.
///
/// Only emptiness is checked.  Ticker syntax and the numeric range of
/// `capital` are left to the analysis service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Trimmed stock symbol, e.g. `"VOD.L"`.
    pub ticker: String,
    /// Capital exactly as typed.
    pub capital: String,
}

impl AnalysisRequest {
    /// Read the raw field values.  The ticker is trimmed, capital is not.
    pub fn from_inputs(ticker: &str, capital: &str) -> Result<Self, ValidationError> {
        let ticker = ticker.trim();

        if ticker.is_empty() || capital.is_empty() {
            return Err(ValidationError::MissingInput);
        }

        Ok(Self {
            ticker:  ticker.to_string(),
            capital: capital.to_string(),
        })
    }

    /// `GET` target on the analysis service.  Values are interpolated as-is;
    /// the HTTP client's URL parser does whatever escaping it does.
    pub fn url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        format!(
            "{base}/analyze?ticker={}&capital={}",
            self.ticker, self.capital
        )
    }
}
