//! HTTP Digest authentication (RFC 2617, MD5, `qop=auth`).
//!
//! TR-064 rejects the first request with a `401` carrying a
//! `WWW-Authenticate: Digest ...` challenge; every following request signs
//! itself with the challenge nonce and an increasing nonce count.

use md5::{Digest, Md5};

/// A parsed `WWW-Authenticate: Digest` challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    pub qop: Option<String>,
    pub opaque: Option<String>,
    pub algorithm: Option<String>,
}

impl DigestChallenge {
    /// Parse a header value. Returns `None` for non-digest schemes or when
    /// `realm`/`nonce` are missing.
    pub fn parse(header: &str) -> Option<Self> {
        let header = header.trim();
        let (scheme, params) = header.split_once(char::is_whitespace)?;
        if !scheme.eq_ignore_ascii_case("digest") {
            return None;
        }

        let mut realm = None;
        let mut nonce = None;
        let mut qop = None;
        let mut opaque = None;
        let mut algorithm = None;

        for (key, value) in parse_params(params) {
            match key.to_ascii_lowercase().as_str() {
                "realm" => realm = Some(value),
                "nonce" => nonce = Some(value),
                "qop" => qop = Some(value),
                "opaque" => opaque = Some(value),
                "algorithm" => algorithm = Some(value),
                _ => {}
            }
        }

        Some(Self {
            realm: realm?,
            nonce: nonce?,
            qop,
            opaque,
            algorithm,
        })
    }

    /// Whether the server offers `qop=auth` (possibly among other options).
    fn supports_auth_qop(&self) -> bool {
        self.qop
            .as_deref()
            .map(|q| q.split(',').any(|o| o.trim().eq_ignore_ascii_case("auth")))
            .unwrap_or(false)
    }

    /// Compute the `response` field of the authorization header.
    pub fn response(
        &self,
        user: &str,
        password: &str,
        method: &str,
        uri: &str,
        nc: u32,
        cnonce: &str,
    ) -> String {
        let ha1 = md5_hex(&format!("{}:{}:{}", user, self.realm, password));
        let ha2 = md5_hex(&format!("{}:{}", method, uri));

        if self.supports_auth_qop() {
            md5_hex(&format!(
                "{}:{}:{:08x}:{}:auth:{}",
                ha1, self.nonce, nc, cnonce, ha2
            ))
        } else {
            md5_hex(&format!("{}:{}:{}", ha1, self.nonce, ha2))
        }
    }

    /// Build a complete `Authorization` header value.
    pub fn authorization(
        &self,
        user: &str,
        password: &str,
        method: &str,
        uri: &str,
        nc: u32,
        cnonce: &str,
    ) -> String {
        let response = self.response(user, password, method, uri, nc, cnonce);
        let mut header = format!(
            "Digest username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{}\", response=\"{}\"",
            user, self.realm, self.nonce, uri, response
        );
        if self.supports_auth_qop() {
            header.push_str(&format!(", qop=auth, nc={:08x}, cnonce=\"{}\"", nc, cnonce));
        }
        if let Some(opaque) = &self.opaque {
            header.push_str(&format!(", opaque=\"{}\"", opaque));
        }
        if let Some(algorithm) = &self.algorithm {
            header.push_str(&format!(", algorithm={}", algorithm));
        }
        header
    }
}

/// Random client nonce.
pub fn cnonce() -> String {
    format!("{:016x}", rand::random::<u64>())
}

fn md5_hex(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Split `key=value, key="quoted, value"` pairs.
fn parse_params(input: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut rest = input.trim_start();

    while !rest.is_empty() {
        let Some((key, after)) = rest.split_once('=') else {
            break;
        };
        let key = key.trim().trim_start_matches(',').trim().to_string();
        let after = after.trim_start();

        let (value, remaining) = if let Some(quoted) = after.strip_prefix('"') {
            let mut value = String::new();
            let mut chars = quoted.char_indices();
            let mut end = quoted.len();
            while let Some((i, c)) = chars.next() {
                match c {
                    '\\' => {
                        if let Some((_, escaped)) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    '"' => {
                        end = i + 1;
                        break;
                    }
                    _ => value.push(c),
                }
            }
            (value, &quoted[end..])
        } else {
            let end = after.find(',').unwrap_or(after.len());
            (after[..end].trim().to_string(), &after[end..])
        };

        params.push((key, value));
        rest = remaining.trim_start().trim_start_matches(',').trim_start();
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    const RFC_CHALLENGE: &str = r#"Digest realm="testrealm@host.com", qop="auth,auth-int", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", opaque="5ccc069c403ebaf9f0171e9517f40e41""#;

    #[test]
    fn test_parse_challenge() {
        let challenge = DigestChallenge::parse(RFC_CHALLENGE).unwrap();
        assert_eq!(challenge.realm, "testrealm@host.com");
        assert_eq!(challenge.nonce, "dcd98b7102dd2f0e8b11d0f600bfb0c093");
        assert_eq!(challenge.qop.as_deref(), Some("auth,auth-int"));
        assert_eq!(
            challenge.opaque.as_deref(),
            Some("5ccc069c403ebaf9f0171e9517f40e41")
        );
        assert_eq!(challenge.algorithm, None);
    }

    #[test]
    fn test_rfc2617_response() {
        let challenge = DigestChallenge::parse(RFC_CHALLENGE).unwrap();
        let response = challenge.response(
            "Mufasa",
            "Circle Of Life",
            "GET",
            "/dir/index.html",
            1,
            "0a4f113b",
        );
        assert_eq!(response, "6629fae49393a05397450978507c4ef1");
    }

    #[test]
    fn test_authorization_header() {
        let challenge = DigestChallenge::parse(
            r#"Digest realm="F!Box SOAP-Auth", nonce="ABCDEF", algorithm=MD5, qop="auth""#,
        )
        .unwrap();
        assert_eq!(challenge.algorithm.as_deref(), Some("MD5"));

        let header = challenge.authorization("user", "pw", "POST", "/upnp/control/x", 2, "c0ffee");
        assert!(header.starts_with("Digest username=\"user\", realm=\"F!Box SOAP-Auth\""));
        assert!(header.contains("uri=\"/upnp/control/x\""));
        assert!(header.contains("qop=auth, nc=00000002, cnonce=\"c0ffee\""));
        assert!(header.ends_with("algorithm=MD5"));
    }

    #[test]
    fn test_non_digest_scheme_rejected() {
        assert!(DigestChallenge::parse(r#"Basic realm="x""#).is_none());
        assert!(DigestChallenge::parse(r#"Digest realm="x""#).is_none());
    }

    #[test]
    fn test_cnonce_shape() {
        let n = cnonce();
        assert_eq!(n.len(), 16);
        assert!(n.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
