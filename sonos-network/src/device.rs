//! Device handles
//!
//! One handle per physical unit. The model number is fetched from the device
//! description on first use and kept for the lifetime of the handle.

use std::fmt;
use std::sync::{Arc, OnceLock};

use sonos_api::SonosClient;
use sonos_discovery::device::{DeviceDescription, DESCRIPTION_PATH};
use sonos_discovery::DeviceAddress;
use tracing::debug;

use crate::error::{Result, SonosError};

/// Zone player models that play audio, with their product names.
///
/// Models missing here (bridges, boosts) are never treated as speakers.
const SPEAKER_MODELS: &[(&str, &str)] = &[
    ("S1", "PLAY:1"),
    ("S12", "PLAY:1"),
    ("S3", "PLAY:3"),
    ("S5", "PLAY:5"),
    ("S6", "PLAY:5"),
    ("S24", "PLAY:5"),
    ("S9", "PLAYBAR"),
    ("S11", "PLAYBASE"),
    ("S13", "ONE"),
    ("S18", "ONE"),
    ("S14", "BEAM"),
    ("S15", "CONNECT"),
    ("S17", "MOVE"),
    ("S19", "ARC"),
    ("S20", "SYMFONISK"),
    ("ZP80", "ZONEPLAYER"),
    ("ZP90", "CONNECT"),
    ("S16", "CONNECT:AMP"),
    ("ZP100", "CONNECT:AMP"),
    ("ZP120", "CONNECT:AMP"),
];

/// Product name for a speaker model number, `None` for non-speaker models
pub fn speaker_model_name(model: &str) -> Option<&'static str> {
    SPEAKER_MODELS
        .iter()
        .find(|(number, _)| *number == model)
        .map(|(_, name)| *name)
}

/// Handle to one physical unit on the network.
///
/// Cloning is cheap and clones share the cached model. Two handles are
/// equal when they point at the same address.
#[derive(Clone)]
pub struct DeviceHandle {
    inner: Arc<DeviceInner>,
}

struct DeviceInner {
    address: DeviceAddress,
    client: SonosClient,
    model: OnceLock<String>,
}

impl DeviceHandle {
    pub fn new(address: DeviceAddress, client: SonosClient) -> Self {
        Self {
            inner: Arc::new(DeviceInner {
                address,
                client,
                model: OnceLock::new(),
            }),
        }
    }

    pub fn address(&self) -> &DeviceAddress {
        &self.inner.address
    }

    /// Host used to reach the device
    pub fn ip(&self) -> &str {
        self.inner.address.as_str()
    }

    /// Model number from the device description, e.g. "S18"
    pub fn model(&self) -> Result<String> {
        if let Some(model) = self.inner.model.get() {
            return Ok(model.clone());
        }

        let xml = self.inner.client.fetch(self.ip(), DESCRIPTION_PATH)?;
        let description = DeviceDescription::from_xml(&xml)?;
        let model = description.model().to_string();
        debug!(address = %self.address(), model = %model, "Fetched device model");

        Ok(self.inner.model.get_or_init(|| model).clone())
    }

    /// Whether the device plays audio
    pub fn is_speaker(&self) -> Result<bool> {
        Ok(speaker_model_name(&self.model()?).is_some())
    }

    /// Product name of the model, e.g. "BEAM"
    pub fn model_name(&self) -> Result<Option<&'static str>> {
        Ok(speaker_model_name(&self.model()?))
    }

    pub(crate) fn client(&self) -> &SonosClient {
        &self.inner.client
    }

    pub(crate) fn fetch(&self, path: &str) -> Result<String> {
        self.inner
            .client
            .fetch(self.ip(), path)
            .map_err(SonosError::from)
    }
}

impl PartialEq for DeviceHandle {
    fn eq(&self, other: &Self) -> bool {
        self.inner.address == other.inner.address
    }
}

impl Eq for DeviceHandle {}

impl fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("address", &self.inner.address)
            .field("model", &self.inner.model.get())
            .finish()
    }
}
