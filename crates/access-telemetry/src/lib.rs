//! # Access Telemetry
//!
//! Observability bootstrap for the ledger access layer.
//!
//! ## Components
//!
//! - **Logging**: `tracing` subscriber with an `EnvFilter`, pretty or JSON output
//! - **Metrics**: Prometheus counters and histograms for chaincode calls and
//!   session establishment
//!
//! ## Usage
//!
//! ```rust,ignore
//! use access_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("telemetry");
//!     // invoke / query from here on are logged and measured
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LA_SERVICE_NAME` | `ledger-access` | Service name attached to logs |
//! | `LA_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `LA_JSON_LOGS` | `false` | Emit JSON lines instead of pretty output |
//! | `LA_CONSOLE_OUTPUT` | `true` | Write log lines to stdout at all |

#![warn(clippy::all)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{init_logging, LoggingGuard};
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, MetricsHandle, ERROR_REQUESTS, REGISTRY,
    REQUESTS, SEND_PROPOSAL_DURATION, SEND_TRANSACTION_DURATION, SEND_TRANSACTION_TOTAL_DURATION,
    SESSION_CACHE_LOOKUPS, SESSION_ESTABLISH_DURATION,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize log subscriber: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and register metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics_handle = register_metrics()?;
    let logging_guard = init_logging(&config)?;

    Ok(TelemetryGuard {
        _logging: logging_guard,
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _logging: LoggingGuard,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}
