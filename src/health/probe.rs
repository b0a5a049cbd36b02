//! Status probing.
//!
//! # Responsibilities
//! - Ask the router for the external IPv4 of the monitored service
//! - Capture every transport failure as a `ProbeResult::ProbeError`

use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use crate::device::{DeviceApi, DeviceError};

/// Outcome of one status query.
#[derive(Debug)]
pub enum ProbeResult {
    /// The device answered; `0.0.0.0` means no address is assigned.
    Address(String),
    /// The device could not be queried.
    ProbeError(DeviceError),
}

impl ProbeResult {
    pub fn address(&self) -> Option<&str> {
        match self {
            ProbeResult::Address(a) => Some(a),
            ProbeResult::ProbeError(_) => None,
        }
    }

    pub fn error(&self) -> Option<&DeviceError> {
        match self {
            ProbeResult::Address(_) => None,
            ProbeResult::ProbeError(e) => Some(e),
        }
    }
}

pub struct StatusProbe<D> {
    device: Arc<D>,
    timeout: Duration,
}

impl<D: DeviceApi> StatusProbe<D> {
    pub fn new(device: Arc<D>, timeout: Duration) -> Self {
        Self { device, timeout }
    }

    /// Query the device once. Never fails; errors are part of the result.
    pub async fn probe(&self) -> ProbeResult {
        match time::timeout(self.timeout, self.device.external_ip_address()).await {
            Ok(Ok(address)) => ProbeResult::Address(address),
            Ok(Err(e)) => ProbeResult::ProbeError(e),
            Err(_) => ProbeResult::ProbeError(DeviceError::Timeout(self.timeout.as_secs())),
        }
    }
}
