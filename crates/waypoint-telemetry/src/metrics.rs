//! Prometheus metrics for Waypoint components.
//!
//! All metrics follow the naming convention: `wp_<component>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., notifications_total)
//! - **CounterVec**: Counter partitioned by label (e.g., by notification kind)

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // MATCHING ENGINE METRICS (Subsystem 01)
    // =========================================================================

    /// Notifications emitted, by kind (sent/received/relayed/hop/bridge/timeout)
    pub static ref NOTIFICATIONS: CounterVec = CounterVec::new(
        Opts::new("wp_engine_notifications_total", "Journey notifications emitted"),
        &["kind"]
    ).expect("metric creation failed");

    /// Partial observations ingested, by operation
    pub static ref OBSERVATIONS: CounterVec = CounterVec::new(
        Opts::new("wp_engine_observations_total", "Partial observations ingested"),
        &["operation"]
    ).expect("metric creation failed");

    /// Non-fatal engine failures, by operation
    pub static ref ENGINE_ERRORS: CounterVec = CounterVec::new(
        Opts::new("wp_engine_errors_total", "Non-fatal engine failures"),
        &["operation"]
    ).expect("metric creation failed");

    // =========================================================================
    // JANITOR METRICS (Subsystem 03)
    // =========================================================================

    /// Total sweeps fired by the janitor
    pub static ref SWEEPS_FIRED: Counter = Counter::new(
        "wp_janitor_sweeps_total",
        "Total expiry sweeps fired"
    ).expect("metric creation failed");
}

/// Register all metric families with the global registry.
///
/// Idempotent: re-registration errors from repeated initialization are
/// collapsed into `MetricsInit`.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(NOTIFICATIONS.clone()),
        Box::new(OBSERVATIONS.clone()),
        Box::new(ENGINE_ERRORS.clone()),
        Box::new(SWEEPS_FIRED.clone()),
    ];
    for collector in collectors {
        match REGISTRY.register(collector) {
            Ok(()) => {}
            Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Count one emitted notification.
pub fn record_notification(kind: &str) {
    NOTIFICATIONS.with_label_values(&[kind]).inc();
}

/// Count one non-fatal engine failure.
pub fn record_engine_error(operation: &str) {
    ENGINE_ERRORS.with_label_values(&[operation]).inc();
}

/// Count one janitor sweep.
pub fn record_sweep() {
    SWEEPS_FIRED.inc();
}

/// Render the registry in the Prometheus text exposition format.
#[must_use]
pub fn render_metrics() -> String {
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_is_idempotent() {
        register_metrics().unwrap();
        register_metrics().unwrap();
    }

    #[test]
    fn counters_render_in_text_format() {
        register_metrics().unwrap();
        record_notification("sent");
        record_notification("received");
        record_sweep();

        let rendered = render_metrics();
        assert!(rendered.contains("wp_engine_notifications_total"));
        assert!(rendered.contains("wp_janitor_sweeps_total"));
    }
}
