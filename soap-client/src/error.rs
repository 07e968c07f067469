//! Error types for the SOAP client

use thiserror::Error;

/// Errors that can occur while talking to a zone player over HTTP
#[derive(Debug, Error)]
pub enum SoapError {
    /// Connection, timeout or non-fault HTTP failure
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// The device answered with XML we could not make sense of
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// SOAP fault returned by the device, carrying the UPnP error code
    #[error("SOAP fault: error code {0}")]
    Fault(u16),
}
