//! # ISA Signal Panel
//!
//! Reads a ticker and a capital amount, asks the remote analysis service for
//! a signal, and renders the answer into a result region as HTML.
//!
//! ## Architecture Overview
//!
//! ```text
//!  ┌──────────────┐  POST /api/panel/analyze   ┌──────────────────────────┐
//!  │  Browser     │ ──────────────────────────▶│ RequestPanel             │
//!  │  (host page) │                             │ ├─ FormFields (inputs)   │   GET /analyze
//!  │              │  GET /api/panel/events      │ ├─ HttpTransport ────────┼──────────────▶ analysis
//!  │  #result  ◀──┼─────────────────────────────┤ └─ ResultRegion (watch)  │                service
//!  └──────────────┘  (SSE, one per change)      └──────────────────────────┘
//! ```
//!
//! ## Environment Variables
//!
//! | Variable                 | Default                                     | Description                         |
//! |--------------------------|---------------------------------------------|-------------------------------------|
//! | `BIND_ADDR`              | `0.0.0.0:3000`                              | Address Axum listens on             |
//! | `ANALYSIS_BASE_URL`      | `https://uk-isa-signal-system.onrender.com` | Analysis service base URL           |
//! | `DEFAULT_CURRENCY`       | `£`                                         | Money prefix when none is returned  |
//! | `ANALYSIS_TIMEOUT_SECS`  | unset                                       | Per-request timeout                 |
//! | `PANEL_STALE_RESPONSES`  | `discard`                                   | `discard` or `overwrite`            |
//! | `DEFAULT_TICKER`         | `BP.L`                                      | Initial ticker field value          |
//! | `DEFAULT_CAPITAL`        | `500`                                       | Initial capital field value         |
//! | `RUST_LOG`               | `isa_signal_panel=debug`                    | Tracing filter                      |

use anyhow::Context;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod error;
mod models;
mod panel;
mod render;
mod routes;
mod state;
mod transport;

use config::Config;
use state::build_state;

// ─── Entry Point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env (optional — real env vars work too) ─────────────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env()
            .add_directive("isa_signal_panel=debug".parse()?)
            .add_directive("tower_http=info".parse()?)
            .add_directive("reqwest=warn".parse()?))
        .init();

    info!(
        r#"

  ╔═══════════════════════════════════════════════╗
  ║        ISA SIGNAL PANEL                       ║
  ║        ticker + capital  →  signal            ║
  ╚═══════════════════════════════════════════════╝"#
    );

    // ── 3. Config + shared state ─────────────────────────────────────────────
    let config = Config::from_env().context("Failed to load config")?;
    let addr = config.bind_addr;

    info!(
        analysis_url = %config.analysis_url,
        stale        = ?config.stale_responses,
        timeout      = ?config.request_timeout,
        "Panel configured"
    );

    let state = build_state(config);

    // ── 4. CORS ──────────────────────────────────────────────────────────────
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // ── 5. Router + middleware ───────────────────────────────────────────────
    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // ── 6. Bind & serve ──────────────────────────────────────────────────────
    info!(?addr, "🚀 ISA Signal Panel starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
