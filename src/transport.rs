//! # transport — outbound call to the analysis service
//!
//! [`AnalysisTransport`] is the seam between the panel and the network.
//! [`HttpTransport`] is the real `reqwest` implementation; tests plug in
//! fakes.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::TransportError;
use crate::models::{AnalysisRequest, AnalysisResponse};

#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    /// Issue one request and decode the body.  Never retries.
    async fn fetch(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, TransportError>;
}

/// `GET {base_url}/analyze?ticker=..&capital=..` over a shared client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client:   reqwest::Client,
    base_url: String,
    timeout:  Option<Duration>,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into(), timeout: None }
    }

    /// Per-request timeout.  Without it the call waits on the client's own limits.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl AnalysisTransport for HttpTransport {
    async fn fetch(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, TransportError> {
        let url = request.url(&self.base_url);

        debug!(url = %url, "Calling analysis service...");

        let mut builder = self.client.get(&url);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let resp = builder.send().await?;

        // The status code is not inspected: an error page that happens to be
        // `{"error": ..}` JSON is still a renderable answer.
        let status = resp.status();
        let body = resp.text().await?;

        debug!(%status, bytes = body.len(), "Analysis response received");

        Ok(AnalysisResponse::from_json(&body)?)
    }
}
