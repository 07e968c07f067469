//! Speaker handle
//!
//! A device joined with its place in the household topology.

use std::fmt;

use sonos_api::UPnPOperation;
use sonos_discovery::DeviceAddress;

use crate::device::DeviceHandle;
use crate::error::{Result, SonosError};
use crate::topology::TopologyEntry;

/// A speaker with its room and group membership
///
/// Handles are snapshots of the topology at resolution time. Re-resolve
/// after grouping changes to get fresh ones.
#[derive(Clone, PartialEq, Eq)]
pub struct SpeakerHandle {
    device: DeviceHandle,
    topology: TopologyEntry,
}

impl SpeakerHandle {
    pub fn new(device: DeviceHandle, topology: TopologyEntry) -> Self {
        Self { device, topology }
    }

    pub fn device(&self) -> &DeviceHandle {
        &self.device
    }

    pub fn address(&self) -> &DeviceAddress {
        self.device.address()
    }

    pub fn ip(&self) -> &str {
        self.device.ip()
    }

    pub fn room(&self) -> &str {
        &self.topology.room
    }

    pub fn uuid(&self) -> &str {
        &self.topology.uuid
    }

    /// Identifier of the group this speaker plays in
    pub fn group(&self) -> &str {
        &self.topology.group
    }

    /// Whether this speaker coordinates its group
    pub fn is_coordinator(&self) -> bool {
        self.topology.coordinator
    }

    pub fn topology(&self) -> &TopologyEntry {
        &self.topology
    }

    pub(crate) fn execute<Op: UPnPOperation>(&self, request: &Op::Request) -> Result<Op::Response> {
        self.device
            .client()
            .execute::<Op>(self.ip(), request)
            .map_err(SonosError::from)
    }
}

impl fmt::Debug for SpeakerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeakerHandle")
            .field("address", self.address())
            .field("room", &self.topology.room)
            .field("group", &self.topology.group)
            .field("coordinator", &self.topology.coordinator)
            .finish()
    }
}
