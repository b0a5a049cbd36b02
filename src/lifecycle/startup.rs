//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging from the loaded configuration
//! - Build the device client and the watchdog
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and no cycle runs
//! - A rejected configuration is still logged, with default log settings

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{load_config, ConfigError, ObservabilityConfig, WatchdogConfig};
use crate::device::{DeviceError, Tr064Client};
use crate::observability::{logging, TracingReporter};
use crate::watchdog::Watchdog;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Device client error: {0}")]
    Device(#[from] DeviceError),
}

/// Load configuration and install logging.
pub fn initialize(config_path: Option<&Path>) -> Result<WatchdogConfig, StartupError> {
    match load_config(config_path) {
        Ok(config) => {
            logging::init(&config.observability);
            tracing::debug!(path = ?config_path, "Configuration loaded");
            Ok(config)
        }
        Err(e) => {
            logging::init(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Configuration rejected, not starting");
            Err(e.into())
        }
    }
}

/// Build the production watchdog for a validated configuration.
pub fn build_watchdog(
    config: &WatchdogConfig,
) -> Result<Watchdog<Tr064Client, TracingReporter>, StartupError> {
    let client = Arc::new(Tr064Client::new(&config.device)?);
    let reporter = TracingReporter::new(config.observability.log_on_cycle);
    Ok(Watchdog::new(client, config, reporter))
}
