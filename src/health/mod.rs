//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Scheduler tick
//!     → probe.rs (query external IPv4, capture errors)
//!     → classifier.rs (ProbeResult → Healthy / Unhealthy)
//!     → state.rs (escalation state machine → optional remediation)
//! ```
//!
//! # Design Decisions
//! - Probing never fails; errors are values
//! - Classification and escalation are pure and synchronous
//! - Escalation state is a plain value owned by the scheduler loop

pub mod classifier;
pub mod probe;
pub mod state;

pub use classifier::{classify, HealthVerdict};
pub use probe::{ProbeResult, StatusProbe};
pub use state::{EscalationEngine, EscalationLadder, EscalationState};
