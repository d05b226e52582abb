//! # Waypoint Telemetry
//!
//! Observability for the journey tracker.
//!
//! ## Components
//!
//! - **Logging**: tracing-subscriber with env-filter; pretty console output
//!   for development, JSON for containers
//! - **Metrics**: Prometheus counters for notifications, sweeps, and engine
//!   errors, with a text-encoder export helper
//!
//! ## Usage
//!
//! ```rust,ignore
//! use waypoint_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_telemetry(&config).expect("Failed to init telemetry");
//!     // Logs and metrics are now being collected
//! }
//! ```

mod config;
mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    record_engine_error, record_notification, record_sweep, register_metrics, render_metrics,
    ENGINE_ERRORS, NOTIFICATIONS, OBSERVATIONS, REGISTRY, SWEEPS_FIRED,
};
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The tracing subscriber could not be installed.
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    /// A metric could not be registered.
    #[error("Failed to register Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and register the metric families.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_setup::init_tracing(config)?;
    metrics::register_metrics()?;
    Ok(())
}
