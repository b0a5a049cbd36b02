//! Device-side types and error definitions.

use thiserror::Error;

// Connection settings live with the rest of the configuration.
pub use crate::config::schema::DeviceConfig;

/// Errors that can occur while talking to the router.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Connection refused, reset, DNS failure, ...
    #[error("HTTP error: {0}")]
    Http(String),

    /// The call did not complete within its deadline.
    #[error("TR-064 call timed out after {0} seconds")]
    Timeout(u64),

    /// Credentials rejected or no usable digest challenge offered.
    #[error("Authentication failed")]
    Auth,

    /// Non-success HTTP status without a SOAP fault body.
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// The device answered with a UPnP error.
    #[error("UPnP fault {code}: {description}")]
    Fault { code: u16, description: String },

    /// The response could not be understood.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The configured host does not form a valid URL.
    #[error("Invalid device URL: {0}")]
    Url(String),
}

impl From<reqwest::Error> for DeviceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            // reqwest does not report the configured duration
            DeviceError::Timeout(0)
        } else {
            DeviceError::Http(e.to_string())
        }
    }
}

impl From<url::ParseError> for DeviceError {
    fn from(e: url::ParseError) -> Self {
        DeviceError::Url(e.to_string())
    }
}

pub type DeviceResult<T> = Result<T, DeviceError>;

/// A TR-064 service addressed by type and control path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRef {
    /// Full URN, e.g. `urn:dslforum-org:service:WANPPPConnection:1`.
    pub service_type: String,
    /// Control path relative to the device root, e.g. `/upnp/control/wanpppconn1`.
    pub control_path: String,
}

impl ServiceRef {
    /// Resolve a service identifier such as `WANPPPConnection1` or `WANIPConnection1`.
    ///
    /// Trailing digits select the instance (default 1).
    pub fn from_identifier(identifier: &str) -> Self {
        let name = identifier.trim_end_matches(|c: char| c.is_ascii_digit());
        let instance = match &identifier[name.len()..] {
            "" => "1",
            digits => digits,
        };

        let control_path = match name {
            "WANPPPConnection" => format!("/upnp/control/wanpppconn{instance}"),
            "WANIPConnection" => format!("/upnp/control/wanipconnection{instance}"),
            "DeviceConfig" => "/upnp/control/deviceconfig".to_string(),
            "DeviceInfo" => "/upnp/control/deviceinfo".to_string(),
            other => format!("/upnp/control/{}", other.to_ascii_lowercase()),
        };

        Self {
            service_type: format!("urn:dslforum-org:service:{name}:1"),
            control_path,
        }
    }

    /// The service that accepts the `Reboot` action.
    pub fn device_config() -> Self {
        Self::from_identifier("DeviceConfig1")
    }
}
