//! TR-064 client with timeout and error handling.
//!
//! # Responsibilities
//! - Sign SOAP requests with HTTP Digest authentication
//! - Query the external IPv4 address of the WAN service
//! - Issue the remediation commands (ForceTermination, Reboot)
//! - Bound every call with a deadline; the router is unreliable by definition

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use reqwest::StatusCode;
use tokio::time::timeout;
use url::Url;

use crate::device::digest::{cnonce, DigestChallenge};
use crate::device::soap;
use crate::device::types::{DeviceConfig, DeviceError, DeviceResult, ServiceRef};

/// Address the device reports while it has no public IPv4.
pub const EMPTY_ADDRESS: &str = "0.0.0.0";

/// Remote-management operations the watchdog relies on.
pub trait DeviceApi: Send + Sync {
    /// Current external IPv4 of the monitored service (`0.0.0.0` when unassigned).
    fn external_ip_address(&self) -> impl Future<Output = DeviceResult<String>> + Send;

    /// Drop and renegotiate the WAN connection.
    fn force_termination(&self) -> impl Future<Output = DeviceResult<()>> + Send;

    /// Reboot the whole device.
    fn reboot(&self) -> impl Future<Output = DeviceResult<()>> + Send;
}

/// TR-064 SOAP client for a FRITZ!Box.
pub struct Tr064Client {
    http: reqwest::Client,
    base_url: Url,
    user: String,
    password: String,
    service: ServiceRef,
    timeout_duration: Duration,
    /// Last digest challenge and the nonce count used with it.
    challenge: Mutex<Option<(DigestChallenge, u32)>>,
}

impl Tr064Client {
    /// Create a new client. No request is sent until the first call.
    pub fn new(config: &DeviceConfig) -> DeviceResult<Self> {
        let timeout_duration = config.timeout();
        let base_url = Url::parse(&format!("http://{}:{}/", config.host, config.port))?;

        let http = reqwest::Client::builder()
            .timeout(timeout_duration)
            .connect_timeout(timeout_duration)
            .no_proxy()
            .build()?;

        tracing::debug!(
            base_url = %base_url,
            service = %config.service,
            "TR-064 client initialized"
        );

        Ok(Self {
            http,
            base_url,
            user: config.user.clone(),
            password: config.password.clone(),
            service: ServiceRef::from_identifier(&config.service),
            timeout_duration,
            challenge: Mutex::new(None),
        })
    }

    /// The WAN service this client polls and heals.
    pub fn service(&self) -> &ServiceRef {
        &self.service
    }

    /// Invoke `action` on `service`, returning the response arguments.
    pub async fn call_action(
        &self,
        service: &ServiceRef,
        action: &str,
    ) -> DeviceResult<HashMap<String, String>> {
        match timeout(self.timeout_duration, self.exchange(service, action)).await {
            Ok(Ok(values)) => Ok(values),
            Ok(Err(DeviceError::Timeout(_))) | Err(_) => {
                Err(DeviceError::Timeout(self.timeout_duration.as_secs()))
            }
            Ok(Err(e)) => Err(e),
        }
    }

    async fn exchange(
        &self,
        service: &ServiceRef,
        action: &str,
    ) -> DeviceResult<HashMap<String, String>> {
        let url = self.base_url.join(&service.control_path)?;
        let uri = url.path().to_string();
        let body = soap::envelope(&service.service_type, action);

        let mut authorization = self.next_authorization(&uri);

        for attempt in 0..2 {
            let mut request = self
                .http
                .post(url.clone())
                .header(CONTENT_TYPE, r#"text/xml; charset="utf-8""#)
                .header("SOAPACTION", soap::soap_action(&service.service_type, action))
                .body(body.clone());
            if let Some(auth) = &authorization {
                request = request.header(AUTHORIZATION, auth);
            }

            let response = request.send().await?;
            let status = response.status();

            if status == StatusCode::UNAUTHORIZED {
                if attempt > 0 {
                    return Err(DeviceError::Auth);
                }
                let challenge = response
                    .headers()
                    .get(WWW_AUTHENTICATE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(DigestChallenge::parse)
                    .ok_or(DeviceError::Auth)?;
                tracing::trace!(realm = %challenge.realm, action, "Received digest challenge");
                authorization = Some(self.accept_challenge(challenge, &uri));
                continue;
            }

            let text = response.text().await?;
            if !status.is_success() {
                return match soap::parse_response(&text) {
                    Err(fault @ DeviceError::Fault { .. }) => Err(fault),
                    _ => Err(DeviceError::Status(status.as_u16())),
                };
            }
            return soap::parse_response(&text);
        }

        Err(DeviceError::Auth)
    }

    /// Sign with the cached challenge, if any.
    fn next_authorization(&self, uri: &str) -> Option<String> {
        let mut guard = self.challenge.lock().ok()?;
        let (challenge, nc) = guard.as_mut()?;
        *nc = nc.wrapping_add(1);
        Some(challenge.authorization(&self.user, &self.password, "POST", uri, *nc, &cnonce()))
    }

    fn accept_challenge(&self, challenge: DigestChallenge, uri: &str) -> String {
        let header =
            challenge.authorization(&self.user, &self.password, "POST", uri, 1, &cnonce());
        if let Ok(mut guard) = self.challenge.lock() {
            *guard = Some((challenge, 1));
        }
        header
    }
}

impl DeviceApi for Tr064Client {
    async fn external_ip_address(&self) -> DeviceResult<String> {
        let values = self.call_action(&self.service, "GetExternalIPAddress").await?;
        let address = values
            .get("NewExternalIPAddress")
            .ok_or_else(|| DeviceError::Malformed("missing NewExternalIPAddress".to_string()))?
            .trim();

        if address.is_empty() {
            Ok(EMPTY_ADDRESS.to_string())
        } else {
            Ok(address.to_string())
        }
    }

    async fn force_termination(&self) -> DeviceResult<()> {
        self.call_action(&self.service, "ForceTermination").await?;
        Ok(())
    }

    async fn reboot(&self) -> DeviceResult<()> {
        self.call_action(&ServiceRef::device_config(), "Reboot").await?;
        // The device forgets its nonces across a restart.
        if let Ok(mut guard) = self.challenge.lock() {
            *guard = None;
        }
        Ok(())
    }
}
