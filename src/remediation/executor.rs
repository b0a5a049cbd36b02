//! Remediation execution.
//!
//! # Responsibilities
//! - Deliver the chosen command to the router
//! - Hold the loop for the reboot cooldown, unless shutdown is requested

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time;

use crate::config::{DeviceConfig, EscalationConfig};
use crate::device::{DeviceApi, DeviceError};
use crate::lifecycle::ShutdownSignal;
use crate::remediation::RemediationAction;

/// The remediation command could not be delivered.
#[derive(Debug, Error)]
#[error("{action} failed: {source}")]
pub struct RemediationError {
    pub action: RemediationAction,
    #[source]
    pub source: DeviceError,
}

/// How a delivered remediation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemediationOutcome {
    /// Command delivered (and cooldown served, for reboots).
    Completed,
    /// Command delivered, cooldown cut short by shutdown.
    Interrupted,
}

pub struct RemediationExecutor<D> {
    device: Arc<D>,
    timeout: Duration,
    reboot_delay: Duration,
}

impl<D: DeviceApi> RemediationExecutor<D> {
    pub fn new(device: Arc<D>, timeout: Duration, reboot_delay: Duration) -> Self {
        Self {
            device,
            timeout,
            reboot_delay,
        }
    }

    pub fn from_config(
        device: Arc<D>,
        device_config: &DeviceConfig,
        config: &EscalationConfig,
    ) -> Self {
        Self::new(device, device_config.timeout(), config.reboot_delay())
    }

    /// Run `action` against the device.
    ///
    /// The command itself is never aborted; only the reboot cooldown reacts
    /// to `shutdown`.
    pub async fn execute(
        &self,
        action: RemediationAction,
        shutdown: &mut ShutdownSignal,
    ) -> Result<RemediationOutcome, RemediationError> {
        match action {
            RemediationAction::Reconnect => {
                tracing::warn!("Healing action: forcing WAN reconnect");
                self.deliver(action, self.device.force_termination()).await?;
                tracing::info!("Reconnect command delivered");
                Ok(RemediationOutcome::Completed)
            }
            RemediationAction::Reboot => {
                tracing::warn!("Healing action: rebooting device");
                self.deliver(action, self.device.reboot()).await?;
                tracing::info!(
                    cooldown_secs = self.reboot_delay.as_secs(),
                    "Reboot command sent, waiting for the device to come back"
                );
                Ok(self.cooldown(shutdown).await)
            }
        }
    }

    async fn deliver<F>(
        &self,
        action: RemediationAction,
        command: F,
    ) -> Result<(), RemediationError>
    where
        F: std::future::Future<Output = Result<(), DeviceError>>,
    {
        let result = match time::timeout(self.timeout, command).await {
            Ok(result) => result,
            Err(_) => Err(DeviceError::Timeout(self.timeout.as_secs())),
        };
        result.map_err(|source| RemediationError { action, source })
    }

    async fn cooldown(&self, shutdown: &mut ShutdownSignal) -> RemediationOutcome {
        tokio::select! {
            _ = time::sleep(self.reboot_delay) => RemediationOutcome::Completed,
            _ = shutdown.cancelled() => {
                tracing::info!("Shutdown requested during reboot cooldown");
                RemediationOutcome::Interrupted
            }
        }
    }
}
