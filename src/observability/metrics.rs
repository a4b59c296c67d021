//! Metrics collection and exposition.
//!
//! # Metrics
//! - `logger_records_total` (counter): records built, by `level`
//! - `logger_records_dropped_total` (counter): sink failures, by `reason`
//! - `logger_requests_total` (counter): requests seen by the middleware,
//!   by correlation id `source` (inherited / generated)
//!
//! Without an installed recorder every update is a no-op.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::logging::correlation::IdSource;
use crate::logging::level::Level;

/// Start the Prometheus exporter HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_emitted(level: Level) {
    counter!("logger_records_total", "level" => level.name()).increment(1);
}

pub fn record_dropped(reason: &'static str) {
    counter!("logger_records_dropped_total", "reason" => reason).increment(1);
}

pub fn record_request(source: IdSource) {
    counter!("logger_requests_total", "source" => source.as_str()).increment(1);
}
