//! # config — read the panel configuration from environment variables

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context};

use crate::panel::StalePolicy;

/// Public deployment of the analysis service.
pub const DEFAULT_BASE_URL: &str = "https://uk-isa-signal-system.onrender.com";

/// Everything the panel host needs at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address Axum listens on
    pub bind_addr:        SocketAddr,
    /// Base URL of the analysis service (`/analyze` is appended)
    pub analysis_url:     String,
    /// Prefix for monetary fields when the response has no `currency`
    pub default_currency: String,
    /// `None` = wait on the transport's own limits
    pub request_timeout:  Option<Duration>,
    /// What happens when an older request resolves after a newer one
    pub stale_responses:  StalePolicy,
    /// Initial value of the ticker field on the host page
    pub default_ticker:   String,
    /// Initial value of the capital field on the host page
    pub default_capital:  String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr:        SocketAddr::from(([0, 0, 0, 0], 3000)),
            analysis_url:     DEFAULT_BASE_URL.to_string(),
            default_currency: "£".to_string(),
            request_timeout:  None,
            stale_responses:  StalePolicy::Discard,
            default_ticker:   "BP.L".to_string(),
            default_capital:  "500".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => raw
                .parse::<SocketAddr>()
                .with_context(|| format!("BIND_ADDR is not a socket address: '{raw}'"))?,
            None => defaults.bind_addr,
        };

        let request_timeout = match lookup("ANALYSIS_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .context("ANALYSIS_TIMEOUT_SECS must be a number")?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let stale_responses = match lookup("PANEL_STALE_RESPONSES")
            .map(|v| v.to_lowercase())
            .as_deref()
        {
            None | Some("discard") => StalePolicy::Discard,
            Some("overwrite") => StalePolicy::Overwrite,
            Some(other) => bail!(
                "Unknown PANEL_STALE_RESPONSES: '{other}'. Use 'discard' or 'overwrite'"
            ),
        };

        let analysis_url = lookup("ANALYSIS_BASE_URL").unwrap_or(defaults.analysis_url);
        if analysis_url.trim().is_empty() {
            bail!("ANALYSIS_BASE_URL must not be empty");
        }

        Ok(Self {
            bind_addr,
            analysis_url,
            default_currency: lookup("DEFAULT_CURRENCY").unwrap_or(defaults.default_currency),
            request_timeout,
            stale_responses,
            default_ticker:   lookup("DEFAULT_TICKER").unwrap_or(defaults.default_ticker),
            default_capital:  lookup("DEFAULT_CAPITAL").unwrap_or(defaults.default_capital),
        })
    }
}
