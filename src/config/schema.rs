//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the watchdog.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the watchdog.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Router connection and credentials.
    pub device: DeviceConfig,

    /// Polling cadence and escalation ladder.
    pub watchdog: EscalationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Connection settings for the router's TR-064 interface.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Router host or LAN IP (e.g., "fritz.box").
    pub host: String,

    /// TR-064 port (49000 for plain HTTP).
    pub port: u16,

    /// User with TR-064 rights.
    pub user: String,

    /// Password of `user`. Required.
    #[serde(skip_serializing)]
    pub password: String,

    /// TR-064 service to poll and heal (e.g., "WANPPPConnection1").
    pub service: String,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: "fritz.box".to_string(),
            port: 49000,
            user: "svc-rebooter".to_string(),
            password: String::new(),
            service: "WANPPPConnection1".to_string(),
            timeout_secs: 10,
        }
    }
}

impl DeviceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Polling and escalation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EscalationConfig {
    /// Polling interval in seconds.
    pub check_every_secs: u64,

    /// Consecutive bad cycles between two remediation attempts.
    pub max_bad_cycles: u32,

    /// Seconds to wait after a reboot command before polling again.
    pub reboot_delay_secs: u64,

    /// First remediation tier that reboots instead of reconnecting.
    pub reboot_from_tier: u32,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            check_every_secs: 60,
            max_bad_cycles: 5,
            reboot_delay_secs: 150,
            reboot_from_tier: 3,
        }
    }
}

impl EscalationConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_every_secs)
    }

    pub fn reboot_delay(&self) -> Duration {
        Duration::from_secs(self.reboot_delay_secs)
    }

    /// Time the address may be missing before the first remediation.
    pub fn grace_period(&self) -> Duration {
        self.check_interval().saturating_mul(self.max_bad_cycles)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON lines instead of human-readable text.
    pub log_json: bool,

    /// Log a healthy poll at info level every N cycles (0 = never).
    pub log_on_cycle: u64,

    /// Serve Prometheus metrics.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            log_on_cycle: 60,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
