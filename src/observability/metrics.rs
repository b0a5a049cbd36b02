//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define watchdog metrics (line health, streak, remediations)
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `watchdog_ipv4_present` (gauge): 1=public IPv4 assigned, 0=missing or router unreachable
//! - `watchdog_consecutive_unhealthy` (gauge): current bad-cycle streak
//! - `watchdog_remediation_tier` (gauge): remediations within the current streak
//! - `watchdog_cycles_total` (counter): completed polling cycles
//! - `watchdog_probe_errors_total` (counter): status queries that failed
//! - `watchdog_remediations_total` (counter): by action, result
//!
//! # Design Decisions
//! - Updates are no-ops until a recorder is installed
//! - The endpoint is opt-in (`metrics_enabled`)

use std::net::SocketAddr;

use ::metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::observability::report::CycleReport;

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_metrics();
            tracing::info!(address = %addr, "Metrics endpoint listening");
        }
        Err(e) => {
            tracing::error!(error = %e, address = %addr, "Failed to install metrics exporter");
        }
    }
}

/// Register help texts with the installed recorder.
pub fn describe_metrics() {
    describe_gauge!(
        "watchdog_ipv4_present",
        "1 when the router reports a public IPv4, 0 otherwise"
    );
    describe_gauge!(
        "watchdog_consecutive_unhealthy",
        "Consecutive unhealthy polling cycles"
    );
    describe_gauge!(
        "watchdog_remediation_tier",
        "Remediation attempts in the current unhealthy streak"
    );
    describe_counter!("watchdog_cycles_total", "Completed polling cycles");
    describe_counter!("watchdog_probe_errors_total", "Failed status queries");
    describe_counter!(
        "watchdog_remediations_total",
        "Remediation commands by action and result"
    );
}

/// Record the outcome of one cycle.
pub fn record_cycle(report: &CycleReport) {
    counter!("watchdog_cycles_total").increment(1);

    let present = if report.verdict.is_healthy() { 1.0 } else { 0.0 };
    gauge!("watchdog_ipv4_present").set(present);
    gauge!("watchdog_consecutive_unhealthy").set(report.consecutive_unhealthy as f64);
    gauge!("watchdog_remediation_tier").set(report.remediation_tier as f64);

    if report.probe_error.is_some() {
        counter!("watchdog_probe_errors_total").increment(1);
    }

    if let Some(action) = report.action {
        let result = if report.remediation_error.is_some() {
            "failed"
        } else {
            "ok"
        };
        counter!(
            "watchdog_remediations_total",
            "action" => action.as_str(),
            "result" => result
        )
        .increment(1);
    }
}
