use std::fmt;
use std::sync::Arc;

use soap_client::SoapClient;
use tracing::{debug, trace};
use xmltree::Element;

use crate::operation::UPnPOperation;
use crate::{Result, Service};

/// Request/response channel to a zone player.
///
/// `SoapClient` is the production implementation. Tests substitute an
/// in-process device.
pub trait Transport: Send + Sync {
    /// Invoke `action` on `service` and return the action response element
    fn call(&self, ip: &str, service: Service, action: &str, payload: &str) -> Result<Element>;

    /// Retrieve a document from the device by path
    fn fetch(&self, ip: &str, path: &str) -> Result<String>;
}

impl Transport for SoapClient {
    fn call(&self, ip: &str, service: Service, action: &str, payload: &str) -> Result<Element> {
        let info = service.info();
        Ok(SoapClient::call(
            self,
            ip,
            info.endpoint,
            info.service_uri,
            action,
            payload,
        )?)
    }

    fn fetch(&self, ip: &str, path: &str) -> Result<String> {
        Ok(SoapClient::fetch(self, ip, path)?)
    }
}

/// A client for executing operations against zone players
///
/// Bridges the stateless operation definitions and the requests sent to
/// devices. Cloning is cheap; clones share the transport.
///
/// # Example
/// ```rust,no_run
/// use sonos_api::SonosClient;
/// use sonos_api::services::content_directory::{BrowseOperation, BrowseOperationRequest};
///
/// let client = SonosClient::new();
/// let request = BrowseOperationRequest::direct_children("Q:0", 0, 100);
/// let response = client.execute::<BrowseOperation>("192.168.1.100", &request)?;
/// println!("{} entries, update id {}", response.total_matches, response.update_id);
/// # Ok::<(), sonos_api::ApiError>(())
/// ```
#[derive(Clone)]
pub struct SonosClient {
    transport: Arc<dyn Transport>,
}

impl SonosClient {
    /// Create a client talking SOAP over HTTP with default timeouts
    pub fn new() -> Self {
        Self::with_soap_client(SoapClient::new())
    }

    /// Create a client with a custom SOAP client configuration
    pub fn with_soap_client(soap_client: SoapClient) -> Self {
        Self {
            transport: Arc::new(soap_client),
        }
    }

    /// Create a client over any transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Execute an operation against a device
    ///
    /// The request is validated and encoded before anything is sent. Errors
    /// are returned as-is; nothing is retried.
    pub fn execute<Op: UPnPOperation>(&self, ip: &str, request: &Op::Request) -> Result<Op::Response> {
        let payload = Op::build_payload(request)?;
        debug!(ip, service = Op::SERVICE.name(), action = Op::ACTION, "Executing operation");
        trace!(payload = %payload, "Operation payload");

        let xml = self.transport.call(ip, Op::SERVICE, Op::ACTION, &payload)?;
        Op::parse_response(&xml)
    }

    /// Retrieve a document from the device by path
    pub fn fetch(&self, ip: &str, path: &str) -> Result<String> {
        debug!(ip, path, "Fetching device document");
        self.transport.fetch(ip, path)
    }
}

impl Default for SonosClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SonosClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SonosClient").finish_non_exhaustive()
    }
}
