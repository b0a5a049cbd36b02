//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, thresholds >= 1)
//! - Reject configurations the watchdog cannot run with (missing password)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WatchdogConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::WatchdogConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("device.password is not set (FRITZ_PASSWORD)")]
    MissingPassword,

    #[error("device.{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("{field} must be at most {max} seconds")]
    TooLarge { field: &'static str, max: u64 },
}

/// Longest accepted polling interval and reboot cooldown.
pub const MAX_PERIOD_SECS: u64 = 86_400;

/// Longest accepted per-call timeout.
pub const MAX_TIMEOUT_SECS: u64 = 3_600;

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &WatchdogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let device = &config.device;
    if device.password.is_empty() {
        errors.push(ValidationError::MissingPassword);
    }
    if device.host.trim().is_empty() {
        errors.push(ValidationError::Empty("host"));
    }
    if device.user.trim().is_empty() {
        errors.push(ValidationError::Empty("user"));
    }
    if device.service.trim().is_empty() {
        errors.push(ValidationError::Empty("service"));
    }
    if device.port == 0 {
        errors.push(ValidationError::Zero("device.port"));
    }
    if device.timeout_secs == 0 {
        errors.push(ValidationError::Zero("device.timeout_secs"));
    }
    check_max(
        &mut errors,
        "device.timeout_secs",
        device.timeout_secs,
        MAX_TIMEOUT_SECS,
    );

    let watchdog = &config.watchdog;
    if watchdog.check_every_secs == 0 {
        errors.push(ValidationError::Zero("watchdog.check_every_secs"));
    }
    check_max(
        &mut errors,
        "watchdog.check_every_secs",
        watchdog.check_every_secs,
        MAX_PERIOD_SECS,
    );
    check_max(
        &mut errors,
        "watchdog.reboot_delay_secs",
        watchdog.reboot_delay_secs,
        MAX_PERIOD_SECS,
    );
    if watchdog.max_bad_cycles == 0 {
        errors.push(ValidationError::Zero("watchdog.max_bad_cycles"));
    }
    if watchdog.reboot_from_tier == 0 {
        errors.push(ValidationError::Zero("watchdog.reboot_from_tier"));
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_max(errors: &mut Vec<ValidationError>, field: &'static str, value: u64, max: u64) {
    if value > max {
        errors.push(ValidationError::TooLarge { field, max });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> WatchdogConfig {
        let mut config = WatchdogConfig::default();
        config.device.password = "secret".into();
        config
    }

    #[test]
    fn test_defaults_with_password_are_valid() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_missing_password_rejected() {
        let errors = validate_config(&WatchdogConfig::default()).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingPassword]);
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = valid();
        config.device.host = " ".into();
        config.watchdog.check_every_secs = 0;
        config.watchdog.max_bad_cycles = 0;
        config.watchdog.reboot_from_tier = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::Empty("host")));
        assert!(errors.contains(&ValidationError::Zero("watchdog.max_bad_cycles")));
    }

    #[test]
    fn test_oversized_durations_rejected() {
        let mut config = valid();
        config.watchdog.check_every_secs = u64::MAX;
        config.watchdog.reboot_delay_secs = MAX_PERIOD_SECS + 1;
        config.device.timeout_secs = MAX_TIMEOUT_SECS + 1;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::TooLarge {
                    field: "device.timeout_secs",
                    max: MAX_TIMEOUT_SECS,
                },
                ValidationError::TooLarge {
                    field: "watchdog.check_every_secs",
                    max: MAX_PERIOD_SECS,
                },
                ValidationError::TooLarge {
                    field: "watchdog.reboot_delay_secs",
                    max: MAX_PERIOD_SECS,
                },
            ]
        );
    }

    #[test]
    fn test_metrics_address_checked_when_enabled() {
        let mut config = valid();
        config.observability.metrics_address = "not an address".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::MetricsAddress("not an address".into())]
        );
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let mut config = valid();
        config.watchdog.check_every_secs = MAX_PERIOD_SECS;
        config.watchdog.reboot_delay_secs = MAX_PERIOD_SECS;
        config.device.timeout_secs = MAX_TIMEOUT_SECS;
        assert!(validate_config(&config).is_ok());
    }
}
