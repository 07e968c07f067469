use soap_client::SoapError;
use thiserror::Error;

use crate::operation::ValidationError;

/// High-level API errors for zone player operations
///
/// Abstracts the SOAP transport details into the failure cases callers
/// actually distinguish.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network communication error
    ///
    /// Connection timeouts, DNS resolution failures, or the device being
    /// unreachable.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Response parsing error
    ///
    /// The device answered but the response is not the expected document,
    /// or a required response value is missing.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// SOAP fault returned by device
    ///
    /// Carries the UPnP error code. A stale UpdateID is reported this way.
    #[error("SOAP fault: error code {0}")]
    SoapFault(u16),

    /// Invalid parameter value, rejected before anything is sent
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

/// Convert from SoapError to ApiError
impl From<SoapError> for ApiError {
    fn from(error: SoapError) -> Self {
        match error {
            SoapError::Network(msg) => ApiError::NetworkError(msg),
            SoapError::Parse(msg) => ApiError::ParseError(msg),
            SoapError::Fault(code) => ApiError::SoapFault(code),
        }
    }
}

/// Convert from ValidationError to ApiError
impl From<ValidationError> for ApiError {
    fn from(validation_error: ValidationError) -> Self {
        match validation_error {
            ValidationError::InvalidValue { parameter, value, reason } => {
                ApiError::InvalidParameter(format!("Invalid value '{}' for parameter '{}': {}", value, parameter, reason))
            }
            ValidationError::RangeError { parameter, value, min, max } => {
                ApiError::InvalidParameter(format!(
                    "Parameter '{}' value {} is out of range [{}, {}]",
                    parameter, value, min, max
                ))
            }
            ValidationError::Custom { parameter, message } => {
                ApiError::InvalidParameter(format!("Parameter '{}': {}", parameter, message))
            }
            ValidationError::MissingParameter { parameter } => {
                ApiError::InvalidParameter(format!("Required parameter '{}' is missing", parameter))
            }
        }
    }
}
