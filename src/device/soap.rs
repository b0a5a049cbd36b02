//! SOAP envelopes for TR-064 actions.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::device::types::{DeviceError, DeviceResult};

/// Value of the `SOAPACTION` header for `action` on `service_type`.
pub fn soap_action(service_type: &str, action: &str) -> String {
    format!("{}#{}", service_type, action)
}

/// Request body for an argument-less action.
pub fn envelope(service_type: &str, action: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<s:Envelope s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/" "#,
            r#"xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">"#,
            r#"<s:Body><u:{action} xmlns:u="{service_type}"></u:{action}></s:Body>"#,
            r#"</s:Envelope>"#,
        ),
        action = action,
        service_type = service_type,
    )
}

/// Collect the leaf elements of a SOAP response into `name → text`.
///
/// A response containing a UPnP fault is turned into [`DeviceError::Fault`].
pub fn parse_response(body: &str) -> DeviceResult<HashMap<String, String>> {
    let mut reader = Reader::from_str(body);
    reader.trim_text(true);

    let mut values = HashMap::new();
    let mut current: Option<String> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                current = Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                text.clear();
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                values.insert(name, String::new());
                current = None;
            }
            Ok(Event::Text(t)) => {
                let unescaped = t
                    .unescape()
                    .map_err(|e| DeviceError::Malformed(e.to_string()))?;
                text.push_str(&unescaped);
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if current.as_deref() == Some(name.as_str()) {
                    values.insert(name, std::mem::take(&mut text));
                }
                current = None;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(DeviceError::Malformed(e.to_string())),
        }
    }

    if values.contains_key("faultcode") || values.contains_key("errorCode") {
        let code = values
            .get("errorCode")
            .and_then(|c| c.trim().parse().ok())
            .unwrap_or(0);
        let description = values
            .get("errorDescription")
            .or_else(|| values.get("faultstring"))
            .cloned()
            .unwrap_or_default();
        return Err(DeviceError::Fault { code, description });
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE: &str = "urn:dslforum-org:service:WANPPPConnection:1";

    #[test]
    fn test_envelope() {
        let body = envelope(SERVICE, "GetExternalIPAddress");
        assert!(body.contains(
            r#"<u:GetExternalIPAddress xmlns:u="urn:dslforum-org:service:WANPPPConnection:1"></u:GetExternalIPAddress>"#
        ));
        assert_eq!(
            soap_action(SERVICE, "ForceTermination"),
            "urn:dslforum-org:service:WANPPPConnection:1#ForceTermination"
        );
    }

    #[test]
    fn test_parse_external_ip() {
        let body = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
<s:Body>
<u:GetExternalIPAddressResponse xmlns:u="urn:dslforum-org:service:WANPPPConnection:1">
<NewExternalIPAddress>84.12.34.56</NewExternalIPAddress>
</u:GetExternalIPAddressResponse>
</s:Body>
</s:Envelope>"#;
        let values = parse_response(body).unwrap();
        assert_eq!(values.get("NewExternalIPAddress").unwrap(), "84.12.34.56");
        assert!(!values.contains_key("Body"));
    }

    #[test]
    fn test_parse_empty_address() {
        let body = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>
<u:GetExternalIPAddressResponse xmlns:u="x"><NewExternalIPAddress></NewExternalIPAddress></u:GetExternalIPAddressResponse>
</s:Body></s:Envelope>"#;
        let values = parse_response(body).unwrap();
        assert_eq!(values.get("NewExternalIPAddress").unwrap(), "");

        let self_closing = r#"<s:Envelope xmlns:s="e"><s:Body><u:R xmlns:u="x"><NewExternalIPAddress/></u:R></s:Body></s:Envelope>"#;
        let values = parse_response(self_closing).unwrap();
        assert_eq!(values.get("NewExternalIPAddress").unwrap(), "");
    }

    #[test]
    fn test_parse_fault() {
        let body = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>
<s:Fault><faultcode>s:Client</faultcode><faultstring>UPnPError</faultstring>
<detail><UPnPError xmlns="urn:dslforum-org:control-1-0"><errorCode>401</errorCode><errorDescription>Invalid Action</errorDescription></UPnPError></detail>
</s:Fault></s:Body></s:Envelope>"#;
        match parse_response(body) {
            Err(DeviceError::Fault { code, description }) => {
                assert_eq!(code, 401);
                assert_eq!(description, "Invalid Action");
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_response("<a><b></a>"),
            Err(DeviceError::Malformed(_))
        ));
    }
}
