//! Prometheus metrics for the token indexer.
//!
//! All metrics are aggregated in the [`Metrics`] struct for easy tracking and management.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Duration;

/// Aggregated metrics for the token indexer.
///
/// Metrics are registered with the global metrics registry on creation. Without
/// an installed exporter every recording is a no-op.
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
        // Query metrics
        describe_counter!(
            "indexer_queries_total",
            "Total number of token queries started"
        );
        describe_counter!(
            "indexer_queries_success_total",
            "Total number of token queries that completed"
        );
        describe_counter!(
            "indexer_queries_failure_total",
            "Total number of token queries that failed"
        );
        describe_counter!(
            "indexer_queries_rejected_total",
            "Total number of query triggers refused before any request"
        );
        describe_histogram!(
            "indexer_query_duration_seconds",
            "Duration of each token query in seconds"
        );

        // Listing metrics
        describe_gauge!(
            "indexer_tokens_total",
            "Number of tokens in the current result set"
        );
        describe_counter!(
            "indexer_load_more_total",
            "Total number of additional pages revealed"
        );

        // Wallet metrics
        describe_counter!(
            "indexer_wallet_events_total",
            "Total wallet events received by kind"
        );
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Query metrics
    // ─────────────────────────────────────────────────────────────────────────────

    /// Record a started query.
    pub fn record_query_started(&self) {
        counter!("indexer_queries_total").increment(1);
    }

    /// Record a completed query.
    pub fn record_query(&self, success: bool, duration: Duration) {
        histogram!("indexer_query_duration_seconds").record(duration.as_secs_f64());

        if success {
            counter!("indexer_queries_success_total").increment(1);
        } else {
            counter!("indexer_queries_failure_total").increment(1);
        }
    }

    /// Record a refused query trigger.
    pub fn record_query_rejected(&self, reason: &str) {
        counter!("indexer_queries_rejected_total", "reason" => reason.to_string()).increment(1);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Listing metrics
    // ─────────────────────────────────────────────────────────────────────────────

    /// Set the size of the current result set.
    pub fn set_tokens_total(&self, total: usize) {
        gauge!("indexer_tokens_total").set(total as f64);
    }

    /// Record a revealed page.
    pub fn record_load_more(&self) {
        counter!("indexer_load_more_total").increment(1);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Wallet metrics
    // ─────────────────────────────────────────────────────────────────────────────

    /// Record a wallet event by kind.
    pub fn record_wallet_event(&self, kind: &'static str) {
        counter!("indexer_wallet_events_total", "kind" => kind).increment(1);
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
