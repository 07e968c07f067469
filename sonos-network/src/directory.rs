//! Device enumeration backed by the address cache

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use sonos_api::SonosClient;
use sonos_discovery::{AddressCache, DeviceAddress, Discovery};
use tracing::{debug, info};

use crate::device::DeviceHandle;
use crate::error::{Result, SonosError};

/// Turns cached addresses into device handles.
///
/// The directory hands out one [`DeviceHandle`] per address for its whole
/// lifetime, so lazily fetched device details are shared by every caller.
pub struct DeviceDirectory {
    cache: Arc<AddressCache>,
    discovery: Discovery,
    client: SonosClient,
    handles: Mutex<HashMap<DeviceAddress, DeviceHandle>>,
}

impl DeviceDirectory {
    pub fn new(cache: Arc<AddressCache>, discovery: Discovery, client: SonosClient) -> Self {
        Self {
            cache,
            discovery,
            client,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// All known devices, in address order
    ///
    /// An empty cache triggers one discovery pass first.
    ///
    /// # Errors
    ///
    /// [`SonosError::NoDevicesFound`] when the cache is still empty after
    /// discovery. Discovery transport failures are propagated.
    pub fn devices(&self) -> Result<Vec<DeviceHandle>> {
        if self.cache.is_empty() {
            info!("Address cache is empty, discovering devices");
            self.discovery.discover(&self.cache)?;
        } else {
            debug!("Using cached device addresses");
        }

        let mut addresses = self.cache.addresses();
        if addresses.is_empty() {
            return Err(SonosError::NoDevicesFound);
        }
        addresses.sort();

        Ok(addresses.into_iter().map(|address| self.handle(address)).collect())
    }

    /// Devices that play audio
    pub fn speakers(&self) -> Result<Vec<DeviceHandle>> {
        let mut speakers = Vec::new();
        for device in self.devices()? {
            if self.is_speaker(&device)? {
                speakers.push(device);
            }
        }
        Ok(speakers)
    }

    /// Whether `device` plays audio
    ///
    /// Classified from the device description on first use, then cached on
    /// the handle.
    pub fn is_speaker(&self, device: &DeviceHandle) -> Result<bool> {
        device.is_speaker()
    }

    /// Handle for `address`, created on first request
    pub fn handle(&self, address: DeviceAddress) -> DeviceHandle {
        self.handles
            .lock()
            .entry(address)
            .or_insert_with_key(|address| DeviceHandle::new(address.clone(), self.client.clone()))
            .clone()
    }

    /// Register an address without running discovery
    ///
    /// Returns `false` when the address was already known.
    pub fn add_address(&self, address: impl Into<DeviceAddress>) -> bool {
        self.cache.add(address.into())
    }

    /// Forget all cached addresses and handles
    pub fn clear(&self) {
        self.cache.clear();
        self.handles.lock().clear();
    }

    pub fn cache(&self) -> &Arc<AddressCache> {
        &self.cache
    }

    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }
}

impl std::fmt::Debug for DeviceDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceDirectory")
            .field("cache", &self.cache)
            .field("discovery", &self.discovery)
            .finish_non_exhaustive()
    }
}
