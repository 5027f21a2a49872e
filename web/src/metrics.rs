//! Prometheus metrics for the web server.

use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Once;
use tracing::warn;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ========== Board Operations ==========

    /// Flip requests by outcome: ok, no_card, controlled, out_of_bounds, error
    pub static ref FLIPS: IntCounterVec = IntCounterVec::new(
        Opts::new("scramble_flips_total", "Flip requests by outcome"),
        &["outcome"]
    ).unwrap();

    pub static ref LOOKS: IntCounter = IntCounter::with_opts(
        Opts::new("scramble_looks_total", "Look requests served")
    ).unwrap();

    pub static ref REPLACES: IntCounter = IntCounter::with_opts(
        Opts::new("scramble_replaces_total", "Replace requests applied")
    ).unwrap();

    /// Watches that saw a change (disconnected watchers are not counted)
    pub static ref WATCHES: IntCounter = IntCounter::with_opts(
        Opts::new("scramble_watches_completed_total", "Watch requests completed")
    ).unwrap();

    /// Flip and watch requests currently waiting on the board
    pub static ref IN_FLIGHT: IntGauge = IntGauge::with_opts(
        Opts::new("scramble_requests_in_flight", "Blocking requests in flight")
    ).unwrap();

    // ========== Request Latency ==========

    pub static ref REQUEST_LATENCY: HistogramVec = HistogramVec::new(
        HistogramOpts::new("scramble_request_duration_seconds", "HTTP request latency")
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]),
        &["endpoint"]
    ).unwrap();
}

static INIT: Once = Once::new();

/// Register all metrics with the registry. Safe to call more than once.
pub fn init_metrics() {
    INIT.call_once(|| {
        REGISTRY.register(Box::new(FLIPS.clone())).unwrap();
        REGISTRY.register(Box::new(LOOKS.clone())).unwrap();
        REGISTRY.register(Box::new(REPLACES.clone())).unwrap();
        REGISTRY.register(Box::new(WATCHES.clone())).unwrap();
        REGISTRY.register(Box::new(IN_FLIGHT.clone())).unwrap();
        REGISTRY
            .register(Box::new(REQUEST_LATENCY.clone()))
            .unwrap();
    });
}

/// Holds the in-flight gauge up until dropped, including when the client
/// disconnects mid-wait.
pub struct InFlight;

impl InFlight {
    pub fn start() -> Self {
        IN_FLIGHT.inc();
        Self
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        IN_FLIGHT.dec();
    }
}

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_init() {
        init_metrics();
        init_metrics();
    }

    #[test]
    fn test_encode_metrics() {
        init_metrics();
        FLIPS.with_label_values(&["ok"]).inc();
        LOOKS.inc();
        let output = encode_metrics();
        assert!(output.contains("scramble_flips_total"));
        assert!(output.contains("scramble_looks_total"));
    }
}
