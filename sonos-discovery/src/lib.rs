//! Zone player discovery library
//!
//! This crate finds zone players on the local network with a single SSDP
//! probe and remembers their addresses across runs through an
//! [`AddressCache`] backed by any [`CacheStore`].
//!
//! # Quick Start
//!
//! ```no_run
//! use sonos_discovery::{AddressCache, Discovery};
//!
//! let cache = AddressCache::in_memory();
//! let found = Discovery::default().discover(&cache)?;
//! for address in found {
//!     println!("Found zone player at {}", address);
//! }
//! # Ok::<(), sonos_discovery::DiscoveryError>(())
//! ```
//!
//! # Persistent cache
//!
//! Discovery is slow and unreliable, so addresses are kept in a store that
//! survives process restarts:
//!
//! ```no_run
//! use std::sync::Arc;
//! use sonos_discovery::{AddressCache, FileStore};
//!
//! let store = FileStore::in_user_cache_dir().expect("no cache directory");
//! let cache = AddressCache::new(Arc::new(store));
//! println!("{} known devices", cache.addresses().len());
//! ```

mod cache;
mod config;
pub mod device;
mod discovery;
mod error;
mod ssdp;

pub use cache::{AddressCache, CacheStore, FileStore, MemoryStore, CACHE_KEY};
pub use config::{DiscoveryConfig, NetworkInterface};
pub use discovery::Discovery;
pub use error::{DiscoveryError, Result};
pub use ssdp::{DiscoveryReply, SEARCH_TARGET};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Network address of a zone player.
///
/// The address string itself is the device's identity: two handles with the
/// same address refer to the same physical unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceAddress(String);

impl DeviceAddress {
    /// Wrap a host name or IP address
    pub fn new(host: impl Into<String>) -> Self {
        Self(host.into())
    }

    /// Extract the host from a device location URL
    ///
    /// # Arguments
    ///
    /// * `location` - URL string (e.g., "http://192.168.1.100:1400/xml/device_description.xml")
    ///
    /// # Returns
    ///
    /// The host portion of the URL, or `None` if the URL is malformed or has no host.
    pub fn from_location(location: &str) -> Option<Self> {
        let url = url::Url::parse(location.trim()).ok()?;
        url.host_str().map(Self::new)
    }

    /// The address as it is used to reach the device
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DeviceAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DeviceAddress {
    fn from(host: &str) -> Self {
        Self::new(host)
    }
}

impl From<String> for DeviceAddress {
    fn from(host: String) -> Self {
        Self(host)
    }
}

/// Run one discovery pass with the default configuration.
///
/// Found addresses are registered in `cache` and returned in the order the
/// devices answered.
pub fn discover(cache: &AddressCache) -> Result<Vec<DeviceAddress>> {
    Discovery::default().discover(cache)
}
