//! FRITZ!Box IPv4 watchdog library.

pub mod config;
pub mod device;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod remediation;
pub mod watchdog;

pub use config::schema::WatchdogConfig;
pub use lifecycle::Shutdown;
pub use watchdog::{RunSummary, Watchdog};
