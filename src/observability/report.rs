//! Per-cycle reporting.
//!
//! The scheduler hands one [`CycleReport`] per tick to a [`Reporter`], plus a
//! start and a stop event. [`TracingReporter`] turns them into log events:
//! address transitions at info/warn, the poll itself at info when something
//! is going on (or every `log_on_cycle` cycles) and at debug otherwise.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::config::WatchdogConfig;
use crate::health::{EscalationState, HealthVerdict, ProbeResult};
use crate::remediation::RemediationAction;

/// Outcome of one scheduler cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// 1-based cycle number.
    pub cycle: u64,
    /// Address reported by the device, if the probe succeeded.
    pub address: Option<String>,
    /// Why the probe failed, if it did.
    pub probe_error: Option<String>,
    pub verdict: HealthVerdict,
    pub consecutive_unhealthy: u32,
    pub remediation_tier: u32,
    pub max_bad_cycles: u32,
    /// Remediation started this cycle.
    pub action: Option<RemediationAction>,
    /// Why that remediation could not be delivered.
    pub remediation_error: Option<String>,
}

impl CycleReport {
    pub fn new(
        cycle: u64,
        probe: &ProbeResult,
        verdict: HealthVerdict,
        state: EscalationState,
        max_bad_cycles: u32,
    ) -> Self {
        Self {
            timestamp_ms: unix_millis(),
            cycle,
            address: probe.address().map(str::to_string),
            probe_error: probe.error().map(ToString::to_string),
            verdict,
            consecutive_unhealthy: state.consecutive_unhealthy,
            remediation_tier: state.remediation_tier,
            max_bad_cycles,
            action: None,
            remediation_error: None,
        }
    }

    pub fn state(&self) -> EscalationState {
        EscalationState::new(self.consecutive_unhealthy, self.remediation_tier)
    }

    /// Healthy, nothing accumulated, nothing done.
    pub fn is_quiet(&self) -> bool {
        self.verdict.is_healthy()
            && self.state() == EscalationState::default()
            && self.action.is_none()
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Sink for watchdog lifecycle and cycle events.
pub trait Reporter: Send {
    fn started(&mut self, config: &WatchdogConfig);
    fn cycle(&mut self, report: &CycleReport);
    fn stopped(&mut self, cycles: u64);
}

/// Reporter that writes through `tracing`.
#[derive(Debug, Default)]
pub struct TracingReporter {
    log_on_cycle: u64,
    last_present: Option<bool>,
    last_address: Option<String>,
}

impl TracingReporter {
    pub fn new(log_on_cycle: u64) -> Self {
        Self {
            log_on_cycle,
            ..Default::default()
        }
    }

    /// Whether a quiet cycle should still be logged at info.
    pub fn is_sample_cycle(&self, cycle: u64) -> bool {
        self.log_on_cycle > 0 && cycle % self.log_on_cycle == 1 % self.log_on_cycle
    }

    fn log_transition(&mut self, report: &CycleReport) {
        let present = report.verdict.is_healthy();

        if self.last_present != Some(present) {
            if present {
                tracing::info!(
                    address = report.address.as_deref().unwrap_or_default(),
                    "IPv4 present"
                );
            } else {
                tracing::warn!(
                    address = report.address.as_deref().unwrap_or("unknown"),
                    "IPv4 missing"
                );
            }
            self.last_present = Some(present);
        } else if present && report.address != self.last_address {
            tracing::info!(
                old = self.last_address.as_deref().unwrap_or_default(),
                new = report.address.as_deref().unwrap_or_default(),
                "IPv4 changed"
            );
        }

        if report.address.is_some() {
            self.last_address = report.address.clone();
        }
    }
}

macro_rules! poll_event {
    ($level:expr, $report:expr) => {
        tracing::event!(
            $level,
            cycle = $report.cycle,
            address = $report.address.as_deref().unwrap_or("-"),
            probe_error = $report.probe_error.as_deref().unwrap_or("none"),
            verdict = ?$report.verdict,
            bad = $report.consecutive_unhealthy,
            max_bad = $report.max_bad_cycles,
            tier = $report.remediation_tier,
            action = $report.action.map(RemediationAction::as_str).unwrap_or("none"),
            "Poll"
        )
    };
}

impl Reporter for TracingReporter {
    fn started(&mut self, config: &WatchdogConfig) {
        tracing::info!(
            host = %config.device.host,
            service = %config.device.service,
            poll_secs = config.watchdog.check_every_secs,
            grace_secs = config.watchdog.grace_period().as_secs(),
            max_bad_cycles = config.watchdog.max_bad_cycles,
            reboot_from_tier = config.watchdog.reboot_from_tier,
            reboot_delay_secs = config.watchdog.reboot_delay_secs,
            "Watchdog started"
        );
    }

    fn cycle(&mut self, report: &CycleReport) {
        if let Some(error) = &report.probe_error {
            tracing::warn!(error = %error, "TR-064 query failed, counting as bad cycle");
        }

        self.log_transition(report);

        if !report.is_quiet() || self.is_sample_cycle(report.cycle) {
            poll_event!(tracing::Level::INFO, report);
        } else {
            poll_event!(tracing::Level::DEBUG, report);
        }

        if let Some(error) = &report.remediation_error {
            tracing::error!(
                action = report.action.map(RemediationAction::as_str).unwrap_or("none"),
                error = %error,
                "Remediation failed"
            );
        }
    }

    fn stopped(&mut self, cycles: u64) {
        tracing::info!(cycles, "Watchdog stopped");
    }
}
