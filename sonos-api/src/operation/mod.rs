//! Operation framework with validation support
//!
//! Operations are stateless descriptions of one SOAP action: which service
//! it belongs to, how its request becomes a payload, and how the response
//! element becomes a typed value. [`SonosClient`](crate::SonosClient)
//! executes them.

pub mod macros;

use std::fmt::{Display, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use xmltree::Element;

use crate::error::ApiError;
use crate::service::Service;

/// Validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Parameter '{parameter}' value '{value}' is out of range ({min}..={max})")]
    RangeError {
        parameter: String,
        value: String,
        min: String,
        max: String,
    },

    #[error("Parameter '{parameter}' value '{value}' is invalid: {reason}")]
    InvalidValue {
        parameter: String,
        value: String,
        reason: String,
    },

    #[error("Required parameter '{parameter}' is missing")]
    MissingParameter { parameter: String },

    #[error("Parameter '{parameter}' failed validation: {message}")]
    Custom { parameter: String, message: String },
}

impl ValidationError {
    pub fn range_error(
        parameter: &str,
        min: impl Display,
        max: impl Display,
        value: impl Display,
    ) -> Self {
        Self::RangeError {
            parameter: parameter.to_string(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    pub fn invalid_value(parameter: &str, value: impl Display, reason: &str) -> Self {
        Self::InvalidValue {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn missing(parameter: &str) -> Self {
        Self::MissingParameter {
            parameter: parameter.to_string(),
        }
    }
}

/// Validation levels for operation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationLevel {
    /// No validation
    None,
    /// Light validation at API boundary - basic type and range checks
    #[default]
    Boundary,
    /// Full validation including domain rules and cross-field constraints
    Comprehensive,
}

/// Trait for types that can be validated
pub trait Validate {
    /// Perform light validation at the API boundary
    fn validate_boundary(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Perform comprehensive validation including domain rules
    fn validate_comprehensive(&self) -> Result<(), ValidationError> {
        self.validate_boundary()
    }

    /// Validate with the specified level
    fn validate(&self, level: ValidationLevel) -> Result<(), ValidationError> {
        match level {
            ValidationLevel::None => Ok(()),
            ValidationLevel::Boundary => self.validate_boundary(),
            ValidationLevel::Comprehensive => self.validate_comprehensive(),
        }
    }
}

/// A single SOAP action with typed request and response
pub trait UPnPOperation {
    /// The request type for this operation, must be serializable and validatable
    type Request: Serialize + Validate;

    /// The response type for this operation
    type Response: for<'de> Deserialize<'de>;

    /// The UPnP service this operation belongs to
    const SERVICE: Service;

    /// The SOAP action name for this operation
    const ACTION: &'static str;

    /// Validate the request and build the XML payload for the SOAP envelope
    fn build_payload(request: &Self::Request) -> Result<String, ValidationError>;

    /// Parse the action response element into the typed response
    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError>;

    /// Get human-readable operation metadata
    fn metadata() -> OperationMetadata {
        OperationMetadata {
            service: Self::SERVICE.name(),
            action: Self::ACTION,
        }
    }
}

/// Metadata about a UPnP operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationMetadata {
    /// The service name (e.g., "AVTransport")
    pub service: &'static str,
    /// The action name (e.g., "Browse")
    pub action: &'static str,
}

/// Append `<name>value</name>` to a payload, escaping the value
pub fn push_element(xml: &mut String, name: &str, value: &impl Display) {
    let value = value.to_string();
    let _ = write!(
        xml,
        "<{name}>{value}</{name}>",
        name = name,
        value = quick_xml::escape::escape(value.as_str())
    );
}

/// Read and parse the text of a required child element.
///
/// A present but empty element reads as the empty string.
pub fn parse_child<T: FromStr>(xml: &Element, name: &str) -> Result<T, ApiError> {
    let child = xml
        .get_child(name)
        .ok_or_else(|| ApiError::ParseError(format!("Missing {} element", name)))?;

    let text = child.get_text().unwrap_or_default();
    text.trim()
        .parse()
        .map_err(|_| ApiError::ParseError(format!("Invalid {} value '{}'", name, text)))
}
