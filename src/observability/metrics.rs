//! Metrics collection and exposition.
//!
//! # Metrics
//! - `url_tester_attempts_total` (counter): attempts by outcome
//! - `url_tester_runs_total` (counter): runs by reachability gate decision
//! - `url_tester_run_duration_seconds` (histogram): wall clock per run
//! - `url_tester_probe_total` (counter): probe results
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - Prometheus exporter is optional and off by default

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished attempt.
pub fn record_attempt(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!("url_tester_attempts_total", "outcome" => outcome).increment(1);
}

/// Record one finished run. `gate` is "accepted" or "rejected".
pub fn record_run(gate: &'static str, start: Instant) {
    metrics::counter!("url_tester_runs_total", "gate" => gate).increment(1);
    metrics::histogram!("url_tester_run_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a reachability probe decision.
pub fn record_probe(reachable: bool) {
    let result = if reachable { "reachable" } else { "unreachable" };
    metrics::counter!("url_tester_probe_total", "result" => result).increment(1);
}
