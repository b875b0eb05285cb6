//! Provider-phase metrics.
//!
//! Installs a Prometheus recorder once per process and exposes counters for
//! provider fetch outcomes. The `/metrics` endpoint renders from the stored
//! handle so short-lived runs work without an external scraper.

use once_cell::sync::OnceCell;
use std::sync::Once;
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceCell<metrics_exporter_prometheus::PrometheusHandle> = OnceCell::new();

/// Initialize the global metrics recorder. Idempotent.
///
/// An HTTP exporter is only started when PROMETHEUS_ADDR is set; the recorder
/// itself is always installed so in-process rendering works.
pub fn init_metrics() {
    INIT.call_once(|| {
        let mut builder = metrics_exporter_prometheus::PrometheusBuilder::new();

        if let Ok(addr_str) = std::env::var("PROMETHEUS_ADDR") {
            match addr_str.parse::<std::net::SocketAddr>() {
                Ok(addr) => {
                    builder = builder.with_http_listener(addr);
                    info!("Prometheus HTTP exporter started at http://{}/metrics", addr);
                }
                Err(_) => {
                    warn!("Invalid PROMETHEUS_ADDR '{}', exporter disabled", addr_str);
                }
            }
        }

        match builder.install_recorder() {
            Ok(handle) => {
                if HANDLE.set(handle).is_err() {
                    warn!("Metrics handle was already set");
                }
                ProviderMetrics::register_metrics();
            }
            Err(e) => {
                warn!("Failed to install Prometheus recorder: {}", e);
            }
        }
    });
}

/// Render the current metrics snapshot, if a recorder is installed.
pub fn render() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

/// Metrics collection for the provider fan-out phase.
pub struct ProviderMetrics;

impl ProviderMetrics {
    /// Record a successful provider fetch.
    pub fn record_fetch_success(_provider: &str, duration_secs: f64, event_count: usize) {
        // Recorded without labels to avoid lifetime issues
        ::metrics::counter!("scout_providers_requests_success").increment(1);
        ::metrics::histogram!("scout_providers_request_duration_seconds").record(duration_secs);
        ::metrics::histogram!("scout_providers_events_returned").record(event_count as f64);
    }

    /// Record a failed or timed-out provider fetch.
    pub fn record_fetch_error(_provider: &str) {
        ::metrics::counter!("scout_providers_requests_error").increment(1);
    }

    /// Pre-register all metrics so they appear in /metrics before first use
    /// (bind to placeholders to satisfy must_use).
    pub fn register_metrics() {
        let _ = ::metrics::counter!("scout_providers_requests_success");
        let _ = ::metrics::counter!("scout_providers_requests_error");
        let _ = ::metrics::histogram!("scout_providers_request_duration_seconds");
        let _ = ::metrics::histogram!("scout_providers_events_returned");
    }
}
