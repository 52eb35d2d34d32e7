//! Prometheus metrics for the watchdog.
//!
//! All metrics are aggregated in the [`Metrics`] struct for easy tracking and management.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Duration;

/// Aggregated metrics for the watchdog.
///
/// Metrics are registered with the global metrics registry on creation. Without
/// an installed exporter every call is a no-op.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance and register all metric descriptions.
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    /// Register metric descriptions with the global registry.
    fn register_descriptions() {
        // Cycle metrics
        describe_counter!(
            "watchdog_cycles_total",
            "Total number of evaluation passes executed"
        );
        describe_counter!(
            "watchdog_cycles_success_total",
            "Total number of evaluation passes that completed"
        );
        describe_counter!(
            "watchdog_cycles_failure_total",
            "Total number of evaluation passes that failed"
        );
        describe_histogram!(
            "watchdog_cycle_duration_seconds",
            "Duration of each evaluation pass in seconds"
        );

        // Breach metrics
        describe_counter!(
            "watchdog_breaches_total",
            "Total number of wallet/asset pairs found below threshold"
        );
        describe_gauge!(
            "watchdog_breaches",
            "Wallet/asset pairs below threshold in the last pass"
        );

        // Alert metrics
        describe_counter!(
            "watchdog_alerts_emitted_total",
            "Total number of alerts sent"
        );
        describe_counter!(
            "watchdog_alerts_suppressed_total",
            "Total number of alerts withheld by the suppression interval"
        );
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Cycle metrics
    // ─────────────────────────────────────────────────────────────────────────────

    /// Record a completed cycle.
    pub fn record_cycle(&self, success: bool, duration: Duration) {
        counter!("watchdog_cycles_total").increment(1);
        histogram!("watchdog_cycle_duration_seconds").record(duration.as_secs_f64());

        if success {
            counter!("watchdog_cycles_success_total").increment(1);
        } else {
            counter!("watchdog_cycles_failure_total").increment(1);
        }
    }

    /// Record the breaches found in one pass.
    pub fn record_breaches(&self, count: usize) {
        counter!("watchdog_breaches_total").increment(count as u64);
        gauge!("watchdog_breaches").set(count as f64);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Alert metrics
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn record_alert_emitted(&self) {
        counter!("watchdog_alerts_emitted_total").increment(1);
    }

    pub fn record_alert_suppressed(&self) {
        counter!("watchdog_alerts_suppressed_total").increment(1);
    }
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
