//! The scheduler loop.
//!
//! One cycle runs to completion before the next begins:
//! tick → probe → classify → escalate → (remediate) → report.
//! Only the loop touches the escalation state, so no locking is needed.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::WatchdogConfig;
use crate::device::DeviceApi;
use crate::health::{classify, EscalationEngine, EscalationState, ProbeResult, StatusProbe};
use crate::lifecycle::ShutdownSignal;
use crate::observability::{metrics, CycleReport, Reporter};
use crate::remediation::RemediationExecutor;

/// What a finished run looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub final_state: EscalationState,
}

pub struct Watchdog<D, R> {
    config: WatchdogConfig,
    device: Arc<D>,
    probe: StatusProbe<D>,
    engine: EscalationEngine,
    executor: RemediationExecutor<D>,
    reporter: R,
    interval: Duration,
}

impl<D: DeviceApi, R: Reporter> Watchdog<D, R> {
    pub fn new(device: Arc<D>, config: &WatchdogConfig, reporter: R) -> Self {
        let timeout = config.device.timeout();
        Self {
            config: config.clone(),
            probe: StatusProbe::new(device.clone(), timeout),
            engine: EscalationEngine::from_config(&config.watchdog),
            executor: RemediationExecutor::from_config(
                device.clone(),
                &config.device,
                &config.watchdog,
            ),
            device,
            reporter,
            interval: config.watchdog.check_interval(),
        }
    }

    /// Override the polling period (sub-second periods are only useful in tests).
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Override the probe/command deadline and the reboot cooldown.
    pub fn with_timings(mut self, timeout: Duration, reboot_delay: Duration) -> Self {
        self.probe = StatusProbe::new(self.device.clone(), timeout);
        self.executor = RemediationExecutor::new(self.device.clone(), timeout, reboot_delay);
        self
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Run until `shutdown` fires.
    pub async fn run(mut self, mut shutdown: ShutdownSignal) -> RunSummary {
        self.reporter.started(&self.config);

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut state = EscalationState::default();
        let mut cycles = 0u64;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.cancelled() => break,
            }

            let result = tokio::select! {
                result = self.probe.probe() => result,
                _ = shutdown.cancelled() => break,
            };

            cycles += 1;
            let (next, report) = self.step(cycles, state, result, &mut shutdown).await;
            state = next;
            self.reporter.cycle(&report);
            metrics::record_cycle(&report);

            if shutdown.is_cancelled() {
                break;
            }
        }

        self.reporter.stopped(cycles);
        RunSummary {
            cycles,
            final_state: state,
        }
    }

    /// Process one probe result: classify, escalate, remediate.
    pub async fn step(
        &mut self,
        cycle: u64,
        state: EscalationState,
        result: ProbeResult,
        shutdown: &mut ShutdownSignal,
    ) -> (EscalationState, CycleReport) {
        let verdict = classify(&result);
        let (next, action) = self.engine.on_tick(verdict, state);

        let mut report =
            CycleReport::new(cycle, &result, verdict, next, self.engine.max_bad_cycles());

        if let Some(action) = action {
            tracing::warn!(
                bad = next.consecutive_unhealthy,
                max_bad = self.engine.max_bad_cycles(),
                tier = next.remediation_tier,
                action = action.as_str(),
                "Grace period exceeded, attempting to heal"
            );
            report.action = Some(action);
            // The tier is consumed whether or not the command gets through.
            if let Err(e) = self.executor.execute(action, shutdown).await {
                report.remediation_error = Some(e.to_string());
            }
        }

        (next, report)
    }
}
