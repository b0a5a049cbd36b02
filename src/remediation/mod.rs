//! Remediation subsystem.
//!
//! # Data Flow
//! ```text
//! EscalationEngine picks an action
//!     → executor.rs
//!         Reconnect → ForceTermination on the WAN service
//!         Reboot    → DeviceConfig:Reboot → cooldown (cancellable)
//! ```
//!
//! # Design Decisions
//! - The reboot cooldown lives inside the remediation call
//! - A failed command is reported, never retried in place
//! - At most one remediation is in flight (the loop is sequential)

pub mod executor;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use executor::{RemediationError, RemediationExecutor, RemediationOutcome};

/// What to do about a missing IPv4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationAction {
    /// Force the WAN connection to terminate and renegotiate.
    Reconnect,
    /// Reboot the whole device.
    Reboot,
}

impl RemediationAction {
    pub fn as_str(self) -> &'static str {
        match self {
            RemediationAction::Reconnect => "reconnect",
            RemediationAction::Reboot => "reboot",
        }
    }
}

impl fmt::Display for RemediationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
