//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Scheduler loop produces:
//!     → report.rs (one CycleReport per tick, start/stop events)
//!     → logging.rs (tracing subscriber: text or JSON on stdout)
//!     → metrics.rs (gauges and counters, optional Prometheus endpoint)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event for machine parsing
//! - Quiet healthy cycles go to debug; anything unusual to info or above
//! - Rotation and shipping are left to the container runtime

pub mod logging;
pub mod metrics;
pub mod report;

pub use report::{CycleReport, Reporter, TracingReporter};
