//! Core discovery logic.
//!
//! A discovery pass:
//! 1. Sends one SSDP M-SEARCH for zone players
//! 2. Collects replies until the timeout elapses
//! 3. Keeps replies whose `st` is exactly the zone player search target
//! 4. Drops repeated `usn` values
//! 5. Registers the host of each `location` in the address cache

use std::collections::HashSet;
use std::net::SocketAddrV4;

use tracing::{debug, info, warn};

use crate::cache::AddressCache;
use crate::config::{DiscoveryConfig, NetworkInterface};
use crate::error::Result;
use crate::ssdp::{DiscoveryReply, SsdpSocket, SEARCH_TARGET};
use crate::DeviceAddress;

/// Finds zone players with an SSDP probe.
///
/// # Examples
///
/// ```no_run
/// use sonos_discovery::{AddressCache, Discovery, DiscoveryConfig};
///
/// let mut discovery = Discovery::new(DiscoveryConfig::from_env());
/// discovery.set_network_interface(Some("eth0".into()));
///
/// let cache = AddressCache::in_memory();
/// let found = discovery.discover(&cache)?;
/// println!("{} zone players answered", found.len());
/// # Ok::<(), sonos_discovery::DiscoveryError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    config: DiscoveryConfig,
}

impl Discovery {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Interface used for the next probe, `None` for the OS default
    pub fn network_interface(&self) -> Option<&NetworkInterface> {
        self.config.network_interface.as_ref()
    }

    pub fn set_network_interface(&mut self, interface: Option<NetworkInterface>) -> &mut Self {
        self.config.network_interface = interface;
        self
    }

    pub fn multicast_address(&self) -> std::net::Ipv4Addr {
        self.config.multicast_address
    }

    pub fn set_multicast_address(&mut self, address: std::net::Ipv4Addr) -> &mut Self {
        self.config.multicast_address = address;
        self
    }

    /// Probe the network and register every answering zone player in `cache`.
    ///
    /// Returns the addresses found by this pass, in reply order. No replies
    /// yields an empty list; only socket failures are errors.
    pub fn discover(&self, cache: &AddressCache) -> Result<Vec<DeviceAddress>> {
        let target = SocketAddrV4::new(self.config.multicast_address, self.config.port);
        info!(%target, "Discovering zone players");

        let replies = {
            let socket = SsdpSocket::open(&self.config)?;
            socket.search(target)?;
            socket.collect(self.config.timeout)?
        };

        let addresses = addresses_from_replies(&replies);
        for address in &addresses {
            cache.add(address.clone());
        }

        info!(count = addresses.len(), "Discovery finished");
        Ok(addresses)
    }
}

/// Reduce raw replies to the distinct zone player addresses they announce
pub(crate) fn addresses_from_replies(replies: &[DiscoveryReply]) -> Vec<DeviceAddress> {
    let mut seen_usns = HashSet::new();
    let mut addresses: Vec<DeviceAddress> = Vec::new();

    for reply in replies {
        if reply.search_target() != Some(SEARCH_TARGET) {
            continue;
        }

        if let Some(usn) = reply.usn() {
            if !seen_usns.insert(usn.to_string()) {
                continue;
            }
        }

        let Some(location) = reply.location() else {
            warn!(usn = reply.usn().unwrap_or_default(), "Zone player reply without location");
            continue;
        };

        let Some(address) = DeviceAddress::from_location(location) else {
            warn!(location, "Zone player reply with unusable location");
            continue;
        };

        debug!(%address, "Found zone player");
        if !addresses.contains(&address) {
            addresses.push(address);
        }
    }

    addresses
}
