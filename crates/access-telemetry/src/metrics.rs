//! Prometheus metrics for the ledger access layer.
//!
//! All metrics follow the naming convention: `ledger_access_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: requests issued, requests failed, session cache lookups
//! - **Histogram**: end-to-end call duration, proposal and transaction phase
//!   durations, session establishment duration

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // REQUEST METRICS
    // =========================================================================

    /// Chaincode calls issued through the invoke/query services
    pub static ref REQUESTS: CounterVec = CounterVec::new(
        Opts::new("ledger_access_requests_total", "Chaincode calls issued"),
        &["mode"]  // mode: submit/evaluate
    ).expect("metric creation failed");

    /// Chaincode calls that ended in a failure result
    pub static ref ERROR_REQUESTS: CounterVec = CounterVec::new(
        Opts::new("ledger_access_error_requests_total", "Chaincode calls that failed"),
        &["mode", "class"]  // class: preflight/endorsement/unclassified/empty
    ).expect("metric creation failed");

    /// End-to-end duration of one call (session resolve + dispatch)
    pub static ref SEND_TRANSACTION_TOTAL_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "ledger_access_send_transaction_total_duration_seconds",
            "Time spent on a chaincode call including session resolution"
        ).buckets(exponential_buckets(0.001, 2.0, 15).expect("bucket layout")),
        &["channel", "chaincode", "function"]
    ).expect("metric creation failed");

    /// Duration of an evaluated proposal (endorse only, no ordering)
    pub static ref SEND_PROPOSAL_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "ledger_access_send_proposal_duration_seconds",
            "Time spent sending a proposal for evaluation"
        ).buckets(exponential_buckets(0.001, 2.0, 15).expect("bucket layout")),
        &["channel", "chaincode", "function"]
    ).expect("metric creation failed");

    /// Duration of a submitted transaction (endorse, order and commit)
    pub static ref SEND_TRANSACTION_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "ledger_access_send_transaction_duration_seconds",
            "Time spent submitting a transaction until commit"
        ).buckets(exponential_buckets(0.001, 2.0, 15).expect("bucket layout")),
        &["channel", "chaincode", "function"]
    ).expect("metric creation failed");

    // =========================================================================
    // SESSION CACHE METRICS
    // =========================================================================

    /// Session establishment duration (profile, wallet, connect, bind)
    pub static ref SESSION_ESTABLISH_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "ledger_access_session_establish_duration_seconds",
            "Time spent establishing a gateway session"
        ).buckets(exponential_buckets(0.001, 2.0, 12).expect("bucket layout"))
    ).expect("metric creation failed");

    /// Session cache lookups by outcome
    pub static ref SESSION_CACHE_LOOKUPS: CounterVec = CounterVec::new(
        Opts::new("ledger_access_session_cache_lookups_total", "Session cache lookups"),
        &["outcome"]  // outcome: hit/miss
    ).expect("metric creation failed");
}

/// Handle to the registry the metrics were registered into
pub struct MetricsHandle {
    registry: Arc<Registry>,
}

impl MetricsHandle {
    /// The registry holding the access-layer metrics.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(REQUESTS.clone()),
        Box::new(ERROR_REQUESTS.clone()),
        Box::new(SEND_TRANSACTION_TOTAL_DURATION.clone()),
        Box::new(SEND_PROPOSAL_DURATION.clone()),
        Box::new(SEND_TRANSACTION_DURATION.clone()),
        Box::new(SESSION_ESTABLISH_DURATION.clone()),
        Box::new(SESSION_CACHE_LOOKUPS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
