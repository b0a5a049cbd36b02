//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Initialize logging → Build client → Run loop
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Trigger token → Loop leaves its current wait → Exit 0
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then logging, then the loop
//! - Shutdown interrupts sleeps and cooldowns, never a command in flight

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
