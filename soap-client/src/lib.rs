//! Private SOAP client for UPnP device communication
//!
//! This crate provides a minimal HTTP transport specifically designed for
//! talking to zone players: SOAP action calls against a service control
//! endpoint, and plain retrieval of device documents such as the device
//! description or the household topology page.

mod error;

pub use error::SoapError;

use std::time::Duration;
use xmltree::Element;

/// Port every zone player serves its UPnP endpoints on
pub const DEFAULT_DEVICE_PORT: u16 = 1400;

/// A minimal SOAP client for UPnP device communication
#[derive(Debug, Clone)]
pub struct SoapClient {
    agent: ureq::Agent,
    port: u16,
}

impl SoapClient {
    /// Create a new SOAP client with default configuration
    pub fn new() -> Self {
        Self::with_timeouts(Duration::from_secs(5), Duration::from_secs(10))
    }

    /// Create a SOAP client with explicit connect and read timeouts
    pub fn with_timeouts(connect: Duration, read: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(connect)
                .timeout_read(read)
                .build(),
            port: DEFAULT_DEVICE_PORT,
        }
    }

    /// Talk to devices on a non-standard port (test servers, port forwards)
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// The device port requests are sent to
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Send a SOAP request and return the parsed response element
    pub fn call(
        &self,
        ip: &str,
        endpoint: &str,
        service_uri: &str,
        action: &str,
        payload: &str,
    ) -> Result<Element, SoapError> {
        let body = format!(
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
                <s:Body>
                    <u:{action} xmlns:u="{service_uri}">
                        {payload}
                    </u:{action}>
                </s:Body>
            </s:Envelope>"#,
            action = action,
            service_uri = service_uri,
            payload = payload
        );

        let url = self.url(ip, endpoint);
        let soap_action = format!("\"{}#{}\"", service_uri, action);

        // A SOAP fault comes back as HTTP 500 with the fault in the body
        let response = match self
            .agent
            .post(&url)
            .set("Content-Type", "text/xml; charset=\"utf-8\"")
            .set("SOAPACTION", &soap_action)
            .send_string(&body)
        {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(e) => return Err(SoapError::Network(e.to_string())),
        };

        let xml_text = response
            .into_string()
            .map_err(|e| SoapError::Network(e.to_string()))?;

        let xml = Element::parse(xml_text.as_bytes())
            .map_err(|e| SoapError::Parse(e.to_string()))?;

        // Extract response or handle SOAP fault
        self.extract_response(&xml, action)
    }

    /// Retrieve a document from the device with a plain GET
    ///
    /// # Arguments
    /// * `ip` - Device IP address
    /// * `path` - Path on the device, e.g. "/status/topology"
    pub fn fetch(&self, ip: &str, path: &str) -> Result<String, SoapError> {
        let url = self.url(ip, path);

        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| SoapError::Network(e.to_string()))?;

        response
            .into_string()
            .map_err(|e| SoapError::Network(e.to_string()))
    }

    fn url(&self, ip: &str, path: &str) -> String {
        format!(
            "http://{}:{}/{}",
            ip,
            self.port,
            path.trim_start_matches('/')
        )
    }

    fn extract_response(&self, xml: &Element, action: &str) -> Result<Element, SoapError> {
        let body = xml
            .get_child("Body")
            .ok_or_else(|| SoapError::Parse("Missing SOAP Body".to_string()))?;

        // Check for SOAP fault first
        if let Some(fault) = body.get_child("Fault") {
            let error_code = fault
                .get_child("detail")
                .and_then(|d| d.get_child("UPnPError").or_else(|| d.get_child("UpnPError")))
                .and_then(|e| e.get_child("errorCode"))
                .and_then(|c| c.get_text())
                .and_then(|t| t.trim().parse::<u16>().ok())
                .unwrap_or(500);
            return Err(SoapError::Fault(error_code));
        }

        // Extract the action response
        let response_name = format!("{}Response", action);
        body.get_child(response_name.as_str())
            .cloned()
            .ok_or_else(|| SoapError::Parse(format!("Missing {} element", response_name)))
    }
}

impl Default for SoapClient {
    fn default() -> Self {
        Self::new()
    }
}
