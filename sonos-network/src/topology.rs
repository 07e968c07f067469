//! Group topology resolution
//!
//! One zone player is asked for the household topology document; each
//! `ZonePlayer` record in it is matched to a discovered speaker by the host
//! of its `location` URL.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;
use sonos_discovery::DeviceAddress;
use tracing::{debug, info, warn};

use crate::device::DeviceHandle;
use crate::error::{Result, SonosError};
use crate::speaker::SpeakerHandle;

/// Path of the topology document on every zone player
pub const TOPOLOGY_PATH: &str = "/status/topology";

/// Speakers keyed by address
pub type SpeakerMap = BTreeMap<DeviceAddress, SpeakerHandle>;

#[derive(Debug, Deserialize)]
struct SupportInfo {
    #[serde(rename = "ZonePlayers")]
    zone_players: ZonePlayers,
}

#[derive(Debug, Deserialize)]
struct ZonePlayers {
    #[serde(rename = "ZonePlayer", default)]
    players: Vec<ZonePlayerRecord>,
}

#[derive(Debug, Deserialize)]
struct ZonePlayerRecord {
    #[serde(rename = "@group", default)]
    group: String,
    #[serde(rename = "@coordinator", default)]
    coordinator: String,
    #[serde(rename = "@uuid", default)]
    uuid: String,
    #[serde(rename = "@location")]
    location: String,
    #[serde(rename = "$text", default)]
    room: String,
}

/// Topology attributes of one zone player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyEntry {
    /// Room name shown in the Sonos apps
    pub room: String,
    pub uuid: String,
    /// Identifier of the group the player belongs to
    pub group: String,
    /// Whether the player coordinates its group
    pub coordinator: bool,
    /// Device description URL as announced in the topology
    pub location: String,
}

/// Parse a topology document into entries keyed by device address.
///
/// Records without a usable location are skipped.
pub fn parse_topology(xml: &str) -> Result<HashMap<DeviceAddress, TopologyEntry>> {
    let info: SupportInfo = quick_xml::de::from_str(xml)
        .map_err(|e| SonosError::Parse(format!("Failed to parse topology: {}", e)))?;

    let mut entries = HashMap::new();
    for record in info.zone_players.players {
        let Some(address) = DeviceAddress::from_location(&record.location) else {
            warn!(location = %record.location, "Skipping topology record with unusable location");
            continue;
        };

        entries.insert(
            address,
            TopologyEntry {
                room: record.room.trim().to_string(),
                uuid: record.uuid,
                group: record.group,
                coordinator: record.coordinator.trim().eq_ignore_ascii_case("true"),
                location: record.location,
            },
        );
    }

    Ok(entries)
}

/// Joins speakers with their topology entries.
///
/// The first resolution is memoized. Call [`invalidate`](Self::invalidate)
/// before resolving again to pick up grouping changes.
#[derive(Debug, Default)]
pub struct TopologyResolver {
    speakers: RwLock<Option<Arc<SpeakerMap>>>,
}

impl TopologyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a [`SpeakerHandle`] for every speaker in `devices`
    ///
    /// The topology document is fetched from the first device. Devices that
    /// are not speakers are left out.
    ///
    /// # Errors
    ///
    /// [`SonosError::TopologyMismatch`] when a speaker has no topology
    /// record, [`SonosError::NoDevicesFound`] when `devices` is empty.
    pub fn resolve(&self, devices: &[DeviceHandle]) -> Result<Arc<SpeakerMap>> {
        if let Some(speakers) = self.speakers.read().as_ref() {
            return Ok(Arc::clone(speakers));
        }

        let mut slot = self.speakers.write();
        if let Some(speakers) = slot.as_ref() {
            return Ok(Arc::clone(speakers));
        }

        let source = devices.first().ok_or(SonosError::NoDevicesFound)?;
        info!(address = %source.address(), path = TOPOLOGY_PATH, "Fetching topology");
        let mut entries = parse_topology(&source.fetch(TOPOLOGY_PATH)?)?;

        let mut speakers = SpeakerMap::new();
        for device in devices {
            if !device.is_speaker()? {
                continue;
            }
            let topology = entries
                .remove(device.address())
                .ok_or_else(|| SonosError::TopologyMismatch {
                    address: device.address().clone(),
                })?;

            debug!(address = %device.address(), room = %topology.room, "Created speaker");
            speakers.insert(
                device.address().clone(),
                SpeakerHandle::new(device.clone(), topology),
            );
        }

        let speakers = Arc::new(speakers);
        *slot = Some(Arc::clone(&speakers));
        Ok(speakers)
    }

    /// Drop the memoized speakers
    pub fn invalidate(&self) {
        self.speakers.write().take();
    }

    pub fn is_resolved(&self) -> bool {
        self.speakers.read().is_some()
    }
}
