//! Shared utilities for integration testing: a mock TR-064 router.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use fritz_watchdog::device::digest::DigestChallenge;

pub const USER: &str = "svc-rebooter";
pub const PASSWORD: &str = "correct horse";
pub const REALM: &str = "F!Box SOAP-Auth";

/// A parsed request as seen by the mock router.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub path: String,
    pub soap_action: String,
    pub authorization: Option<String>,
    pub body: String,
}

/// Programmable FRITZ!Box stand-in.
#[derive(Default)]
pub struct MockFritz {
    /// Address returned by GetExternalIPAddress.
    pub external_ip: Mutex<String>,
    /// Address to switch to when ForceTermination arrives.
    pub ip_after_reconnect: Mutex<Option<String>>,
    pub requests: AtomicU32,
    pub challenges: AtomicU32,
    pub reconnects: AtomicU32,
    pub reboots: AtomicU32,
    /// Answer every action with a UPnP fault.
    pub fault: Mutex<Option<(u16, String)>>,
    /// Accept connections but never answer.
    pub hang: Mutex<bool>,
    nonce: Mutex<String>,
    nonce_counter: AtomicU32,
}

impl MockFritz {
    pub fn new(external_ip: &str) -> Arc<Self> {
        let mock = Self::default();
        *mock.external_ip.lock().unwrap() = external_ip.to_string();
        Arc::new(mock)
    }

    pub fn set_ip(&self, ip: &str) {
        *self.external_ip.lock().unwrap() = ip.to_string();
    }

    /// Invalidate the current nonce, as a reboot does.
    pub fn rotate_nonce(&self) {
        let n = self.nonce_counter.fetch_add(1, Ordering::SeqCst) + 1;
        *self.nonce.lock().unwrap() = format!("{:016X}", 0xF1F1_0000u64 + n as u64);
    }

    fn challenge_header(&self) -> String {
        format!(
            r#"Digest realm="{}", nonce="{}", algorithm=MD5, qop="auth""#,
            REALM,
            self.nonce.lock().unwrap()
        )
    }

    fn is_authorized(&self, request: &MockRequest) -> bool {
        let Some(header) = &request.authorization else {
            return false;
        };
        let nonce = self.nonce.lock().unwrap().clone();
        if param(header, "username").as_deref() != Some(USER)
            || param(header, "nonce") != Some(nonce.clone())
        {
            return false;
        }
        let (Some(nc), Some(cnonce), Some(response)) =
            (param(header, "nc"), param(header, "cnonce"), param(header, "response"))
        else {
            return false;
        };
        let Ok(nc) = u32::from_str_radix(&nc, 16) else {
            return false;
        };

        let challenge = DigestChallenge {
            realm: REALM.to_string(),
            nonce,
            qop: Some("auth".to_string()),
            opaque: None,
            algorithm: Some("MD5".to_string()),
        };
        challenge.response(USER, PASSWORD, "POST", &request.path, nc, &cnonce) == response
    }

    fn handle(&self, request: &MockRequest) -> (u16, Vec<(String, String)>, String) {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if !self.is_authorized(request) {
            self.challenges.fetch_add(1, Ordering::SeqCst);
            return (
                401,
                vec![("WWW-Authenticate".to_string(), self.challenge_header())],
                String::new(),
            );
        }

        if let Some((code, description)) = self.fault.lock().unwrap().clone() {
            return (500, vec![], fault_body(code, &description));
        }

        let action = request.soap_action.rsplit('#').next().unwrap_or_default().to_string();
        match action.as_str() {
            "GetExternalIPAddress" => {
                let ip = self.external_ip.lock().unwrap().clone();
                let body = response_body(
                    &action,
                    &format!("<NewExternalIPAddress>{}</NewExternalIPAddress>", ip),
                );
                (200, vec![], body)
            }
            "ForceTermination" => {
                self.reconnects.fetch_add(1, Ordering::SeqCst);
                if let Some(ip) = self.ip_after_reconnect.lock().unwrap().clone() {
                    self.set_ip(&ip);
                }
                (200, vec![], response_body(&action, ""))
            }
            "Reboot" => {
                self.reboots.fetch_add(1, Ordering::SeqCst);
                let body = response_body(&action, "");
                self.rotate_nonce();
                (200, vec![], body)
            }
            _ => (500, vec![], fault_body(401, "Invalid Action")),
        }
    }
}

/// Start the mock router on an ephemeral port.
pub async fn start_mock_fritz(mock: Arc<MockFritz>) -> SocketAddr {
    mock.rotate_nonce();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let mock = mock.clone();
                    tokio::spawn(async move {
                        serve_connection(socket, mock).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn serve_connection(mut socket: TcpStream, mock: Arc<MockFritz>) {
    loop {
        let Some(request) = read_request(&mut socket).await else {
            return;
        };

        if *mock.hang.lock().unwrap() {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            return;
        }

        let (status, headers, body) = mock.handle(&request);
        let status_text = match status {
            200 => "200 OK",
            401 => "401 Unauthorized",
            _ => "500 Internal Server Error",
        };

        let mut response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/xml; charset=\"utf-8\"\r\nContent-Length: {}\r\n",
            status_text,
            body.len()
        );
        for (name, value) in headers {
            response.push_str(&format!("{}: {}\r\n", name, value));
        }
        response.push_str("\r\n");
        response.push_str(&body);

        if socket.write_all(response.as_bytes()).await.is_err() {
            return;
        }
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<MockRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = find(&buffer, b"\r\n\r\n") {
            break pos + 4;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next()?;
    let path = request_line.split_whitespace().nth(1)?.to_string();

    let mut content_length = 0usize;
    let mut soap_action = String::new();
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim().to_string();
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.parse().unwrap_or(0),
                "soapaction" => soap_action = value.trim_matches('"').to_string(),
                "authorization" => authorization = Some(value),
                _ => {}
            }
        }
    }

    while buffer.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }

    let body =
        String::from_utf8_lossy(&buffer[header_end..header_end + content_length]).to_string();
    Some(MockRequest {
        path,
        soap_action,
        authorization,
        body,
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Extract `name=value` or `name="value"` from a digest header.
pub fn param(header: &str, name: &str) -> Option<String> {
    let header = header.strip_prefix("Digest ").unwrap_or(header);
    header.split(", ").find_map(|part| {
        let (key, value) = part.split_once('=')?;
        (key.trim() == name).then(|| value.trim().trim_matches('"').to_string())
    })
}

fn response_body(action: &str, arguments: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0"?>"#,
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">"#,
            r#"<s:Body><u:{action}Response xmlns:u="urn:dslforum-org:service:Mock:1">{arguments}</u:{action}Response></s:Body>"#,
            r#"</s:Envelope>"#,
        ),
        action = action,
        arguments = arguments,
    )
}

fn fault_body(code: u16, description: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0"?>"#,
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><s:Fault>"#,
            r#"<faultcode>s:Client</faultcode><faultstring>UPnPError</faultstring>"#,
            r#"<detail><UPnPError xmlns="urn:dslforum-org:control-1-0"><errorCode>{code}</errorCode>"#,
            r#"<errorDescription>{description}</errorDescription></UPnPError></detail>"#,
            r#"</s:Fault></s:Body></s:Envelope>"#,
        ),
        code = code,
        description = description,
    )
}
