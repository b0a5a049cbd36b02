//! Escalation state machine.
//!
//! # States
//! The pair `(consecutive_unhealthy, remediation_tier)`, starting at `(0, 0)`.
//!
//! # State Transitions
//! ```text
//! Healthy:   (n, t) → (0, 0), no action
//! Unhealthy: (n, t) → (n+1, t)                  if (n+1) % max_bad_cycles != 0
//!            (n, t) → (n+1, t+1), ladder[t+1]   otherwise
//! ```
//!
//! # Design Decisions
//! - A single healthy observation fully de-escalates (no hysteresis)
//! - Severity never decreases within an unhealthy streak
//! - A failed remediation still consumes its tier
//! - The tier → action mapping is a table, not branching

use serde::Serialize;

use crate::config::EscalationConfig;
use crate::health::classifier::HealthVerdict;
use crate::remediation::RemediationAction;

/// Escalation counters owned by the scheduler loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EscalationState {
    /// Unhealthy ticks since the last healthy one.
    pub consecutive_unhealthy: u32,
    /// Remediation attempts since the last healthy tick.
    pub remediation_tier: u32,
}

impl EscalationState {
    pub fn new(consecutive_unhealthy: u32, remediation_tier: u32) -> Self {
        Self {
            consecutive_unhealthy,
            remediation_tier,
        }
    }
}

/// Remediation action per tier; tiers past the end reuse the last rung.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationLadder {
    rungs: Vec<RemediationAction>,
}

impl EscalationLadder {
    /// Reconnect for tiers below `reboot_from_tier`, reboot from there on.
    pub fn new(reboot_from_tier: u32) -> Self {
        let reconnects = reboot_from_tier.max(1) as usize - 1;
        let mut rungs = vec![RemediationAction::Reconnect; reconnects];
        rungs.push(RemediationAction::Reboot);
        Self { rungs }
    }

    #[cfg(test)]
    fn from_rungs(rungs: Vec<RemediationAction>) -> Option<Self> {
        if rungs.is_empty() {
            None
        } else {
            Some(Self { rungs })
        }
    }

    /// Action for a 1-based tier.
    pub fn action_for(&self, tier: u32) -> RemediationAction {
        let index = (tier.max(1) as usize - 1).min(self.rungs.len() - 1);
        self.rungs[index]
    }

    pub fn rungs(&self) -> &[RemediationAction] {
        &self.rungs
    }
}

impl Default for EscalationLadder {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Decides, once per tick, whether and how to remediate.
#[derive(Debug, Clone)]
pub struct EscalationEngine {
    max_bad_cycles: u32,
    ladder: EscalationLadder,
}

impl EscalationEngine {
    pub fn new(max_bad_cycles: u32, ladder: EscalationLadder) -> Self {
        Self {
            max_bad_cycles: max_bad_cycles.max(1),
            ladder,
        }
    }

    pub fn from_config(config: &EscalationConfig) -> Self {
        Self::new(
            config.max_bad_cycles,
            EscalationLadder::new(config.reboot_from_tier),
        )
    }

    pub fn max_bad_cycles(&self) -> u32 {
        self.max_bad_cycles
    }

    pub fn ladder(&self) -> &EscalationLadder {
        &self.ladder
    }

    /// Advance the state machine by one observation.
    pub fn on_tick(
        &self,
        verdict: HealthVerdict,
        state: EscalationState,
    ) -> (EscalationState, Option<RemediationAction>) {
        match verdict {
            HealthVerdict::Healthy => (EscalationState::default(), None),
            HealthVerdict::Unhealthy => {
                let consecutive_unhealthy = state.consecutive_unhealthy.saturating_add(1);
                if consecutive_unhealthy % self.max_bad_cycles != 0 {
                    return (
                        EscalationState::new(consecutive_unhealthy, state.remediation_tier),
                        None,
                    );
                }

                let remediation_tier = state.remediation_tier.saturating_add(1);
                let action = self.ladder.action_for(remediation_tier);
                (
                    EscalationState::new(consecutive_unhealthy, remediation_tier),
                    Some(action),
                )
            }
        }
    }
}
