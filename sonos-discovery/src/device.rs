//! Device description parsing.
//!
//! Every zone player serves a UPnP device description at
//! [`DESCRIPTION_PATH`]. Only the identifying fields are read here.

use crate::error::{DiscoveryError, Result};
use serde::Deserialize;

/// Path of the device description document on a zone player
pub const DESCRIPTION_PATH: &str = "/xml/device_description.xml";

/// UPnP device description root element.
#[derive(Debug, Deserialize)]
struct Root {
    device: DeviceDescription,
}

/// Identifying fields of a UPnP device description.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescription {
    pub device_type: String,
    pub friendly_name: Option<String>,
    pub manufacturer: Option<String>,
    pub model_name: Option<String>,
    pub model_number: Option<String>,
    #[serde(rename = "UDN")]
    pub udn: Option<String>,
    pub room_name: Option<String>,
}

impl DeviceDescription {
    /// Parse device description from XML.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::ParseError` if the XML is malformed or has no `device` element.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let root: Root = quick_xml::de::from_str(xml)
            .map_err(|e| DiscoveryError::ParseError(format!("Failed to parse device XML: {}", e)))?;

        Ok(root.device)
    }

    /// Model number with surrounding whitespace removed, empty if absent
    pub fn model(&self) -> &str {
        self.model_number.as_deref().map(str::trim).unwrap_or_default()
    }

    /// Whether the description announces a zone player
    pub fn is_zone_player(&self) -> bool {
        self.device_type.contains("ZonePlayer")
    }
}
