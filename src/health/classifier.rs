//! Health classification of a probe result.

use serde::Serialize;

use crate::device::EMPTY_ADDRESS;
use crate::health::probe::ProbeResult;

/// Binary health of the router's public IPv4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthVerdict {
    Healthy,
    Unhealthy,
}

impl HealthVerdict {
    pub fn is_healthy(self) -> bool {
        self == HealthVerdict::Healthy
    }
}

/// Map a probe result to a verdict.
///
/// A device that cannot be queried counts as unhealthy, the same as one
/// reporting the empty address.
pub fn classify(result: &ProbeResult) -> HealthVerdict {
    match result {
        ProbeResult::Address(a) if a == EMPTY_ADDRESS => HealthVerdict::Unhealthy,
        ProbeResult::Address(_) => HealthVerdict::Healthy,
        ProbeResult::ProbeError(_) => HealthVerdict::Unhealthy,
    }
}
