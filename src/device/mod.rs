//! Router remote-management subsystem (TR-064).
//!
//! # Data Flow
//! ```text
//! DeviceApi call (client.rs)
//!     → soap.rs (build envelope, SOAPACTION header)
//!     → POST http://{host}:49000/upnp/control/{service}
//!     → 401 + challenge → digest.rs (sign) → retry once
//!     → soap.rs (parse arguments or UPnP fault)
//! ```
//!
//! # Design Decisions
//! - Every call has a deadline; a hung router never blocks the caller
//! - The digest challenge is cached so steady-state polls need one round trip
//! - Callers depend on the `DeviceApi` trait, not on the transport

pub mod client;
pub mod digest;
pub mod soap;
pub mod types;

pub use client::{DeviceApi, Tr064Client, EMPTY_ADDRESS};
pub use types::{DeviceError, DeviceResult, ServiceRef};
