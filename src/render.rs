//! # render
//!
//! HTML written into the result region and the host page.  Every fragment
//! goes through one `minijinja` environment; templates named `*.html` get
//! HTML auto-escaping, so text from the remote service and from the form
//! never lands in the page raw.  Numbers are formatted here, before they
//! reach a template.

use std::sync::OnceLock;

use minijinja::{context, Environment, Value};
use tracing::error;

use crate::models::AnalysisReport;

pub const LOADING_TEXT: &str = "Loading...";
pub const FETCH_ERROR_TEXT: &str = "Error fetching data";

const TEMPLATES: [(&str, &str); 3] = [
    ("index.html",   include_str!("../templates/index.html")),
    ("report.html",  include_str!("../templates/report.html")),
    ("failure.html", include_str!("../templates/failure.html")),
];

fn environment() -> &'static Environment<'static> {
    static ENV: OnceLock<Environment<'static>> = OnceLock::new();
    ENV.get_or_init(|| {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            if let Err(e) = env.add_template(name, source) {
                error!(template = name, error = %e, "Template failed to parse");
            }
        }
        env
    })
}

/// Render a named template.  A broken template logs and degrades to the
/// fixed fetch-error text.
fn render(name: &str, ctx: Value) -> String {
    environment()
        .get_template(name)
        .and_then(|template| template.render(ctx))
        .unwrap_or_else(|e| {
            error!(template = name, error = %e, "Template render failed");
            FETCH_ERROR_TEXT.to_string()
        })
}

pub fn loading() -> String {
    LOADING_TEXT.to_string()
}

/// Red message for a body carrying `error`.  Nothing else is shown.
pub fn rejected(message: &str) -> String {
    render("failure.html", context! { message })
}

/// Fixed text for transport/decode failures.  The cause is never rendered.
pub fn unavailable() -> String {
    render("failure.html", context! { message => FETCH_ERROR_TEXT })
}

/// One `<strong>Label:</strong> value<br>` line per field.  Money fields
/// carry the response currency, or `default_currency` if it has none.
pub fn report(report: &AnalysisReport, default_currency: &str) -> String {
    render(
        "report.html",
        context! {
            cur            => report.currency.as_deref().unwrap_or(default_currency),
            ticker         => &report.ticker,
            signal         => &report.signal,
            reason         => &report.reason,
            trend          => &report.trend,
            price          => report.price.to_string(),
            rsi            => report.rsi.to_string(),
            position_size  => report.position_size.to_string(),
            risk_per_trade => report.risk_per_trade.to_string(),
            stop_price     => report.stop_price.to_string(),
        },
    )
}

/// Host page with the form values filled in and the region fragment as-is.
pub fn index_page(ticker: &str, capital: &str, region_html: &str) -> String {
    render(
        "index.html",
        context! {
            ticker,
            capital,
            result => region_html,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: [&str; 9] = [
        "Ticker:", "Signal:", "Reason:", "Price:", "Trend:", "RSI:",
        "Position Size:", "Risk per Trade:", "Stop Price:",
    ];

    fn vod_l(currency: Option<&str>) -> AnalysisReport {
        AnalysisReport {
            ticker:         "VOD.L".into(),
            signal:         "BUY".into(),
            reason:         "RSI oversold".into(),
            trend:          "up".into(),
            price:          95.2,
            rsi:            28.4,
            position_size:  200.0,
            risk_per_trade: 20.0,
            stop_price:     90.1,
            currency:       currency.map(str::to_string),
        }
    }

    #[test]
    fn test_report_has_every_label_and_value() {
        let html = report(&vod_l(Some("£")), "£");
        for label in LABELS {
            assert!(html.contains(&format!("<strong>{label}</strong>")), "missing {label}");
        }
        for value in ["VOD.L", "BUY", "RSI oversold", "up", "28.4"] {
            assert!(html.contains(value), "missing {value}");
        }
    }

    #[test]
    fn test_money_fields_use_response_currency() {
        let html = report(&vod_l(Some("€")), "£");
        assert!(html.contains("€95.2"));
        assert!(html.contains("€200"));
        assert!(html.contains("€20<br>"));
        assert!(html.contains("€90.1"));
        assert!(!html.contains('£'));
    }

    #[test]
    fn test_money_fields_fall_back_to_default_currency() {
        let html = report(&vod_l(None), "£");
        assert!(html.contains("<strong>Price:</strong> £95.2<br>"));
        assert!(html.contains("<strong>Stop Price:</strong> £90.1<br>"));
    }

    #[test]
    fn test_rsi_has_no_currency() {
        let html = report(&vod_l(Some("$")), "£");
        assert!(html.contains("<strong>RSI:</strong> 28.4<br>"));
    }

    #[test]
    fn test_rejected_shows_only_the_message() {
        let html = rejected("Ticker not found");
        assert_eq!(html, r#"<span style="color:red">Ticker not found</span>"#);
        for label in LABELS {
            assert!(!html.contains(label));
        }
    }

    #[test]
    fn test_remote_text_is_escaped() {
        let html = rejected("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_quotes_in_remote_text_cannot_break_out() {
        let mut bad = vod_l(Some("£"));
        bad.reason = r#"x" onmouseover="alert(1)"#.into();
        let html = report(&bad, "£");
        assert!(!html.contains(r#"" onmouseover=""#));
    }

    #[test]
    fn test_index_page_keeps_template_syntax_in_values_inert() {
        let region = r#"<span style="color:red">x</span>"#;
        let page = index_page("{{ result }}", "500", region);

        assert!(page.contains(r#"value="{{ result }}""#));
        assert!(!page.contains(r#"value="<span"#));
        assert_eq!(page.matches(region).count(), 1);
    }

    #[test]
    fn test_index_page_escapes_attribute_values() {
        let page = index_page(r#""><script>alert(1)</script>"#, "500", "");
        assert!(!page.contains("<script>alert(1)"));
        assert!(page.contains(r#"value="500""#));
    }

    #[test]
    fn test_unavailable_is_fixed_text() {
        assert_eq!(unavailable(), r#"<span style="color:red">Error fetching data</span>"#);
    }
}
