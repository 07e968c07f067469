//! Configuration for SSDP discovery

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::time::Duration;

/// Well-known SSDP multicast group
pub const DEFAULT_MULTICAST_ADDRESS: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);

/// Well-known SSDP port
pub const DEFAULT_SSDP_PORT: u16 = 1900;

/// Environment variable consulted by [`DiscoveryConfig::from_env`]
pub const INTERFACE_ENV_VAR: &str = "SONOS_NETWORK_INTERFACE";

/// Network interface the probe should leave through.
///
/// Accepts either a symbolic name ("eth0") or a numeric index, the same two
/// forms the multicast-interface socket option understands. An empty name or
/// index 0 leaves the choice to the OS.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NetworkInterface {
    /// Interface name, e.g. "eth0" or "en0"
    Name(String),
    /// Kernel interface index
    Index(u32),
}

impl NetworkInterface {
    /// Whether this value asks for the OS default interface
    pub fn is_default(&self) -> bool {
        match self {
            NetworkInterface::Name(name) => name.is_empty(),
            NetworkInterface::Index(index) => *index == 0,
        }
    }
}

impl FromStr for NetworkInterface {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = s.parse() {
                return Ok(NetworkInterface::Index(index));
            }
        }
        Ok(NetworkInterface::Name(s.to_string()))
    }
}

impl From<&str> for NetworkInterface {
    fn from(name: &str) -> Self {
        NetworkInterface::Name(name.to_string())
    }
}

impl From<u32> for NetworkInterface {
    fn from(index: u32) -> Self {
        NetworkInterface::Index(index)
    }
}

impl fmt::Display for NetworkInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkInterface::Name(name) => f.write_str(name),
            NetworkInterface::Index(index) => write!(f, "#{}", index),
        }
    }
}

/// Configuration for a discovery probe
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    /// Address the M-SEARCH is sent to
    /// Default: 239.255.255.250
    pub multicast_address: Ipv4Addr,

    /// Destination port of the probe
    /// Default: 1900
    pub port: u16,

    /// How long replies are collected after the probe is sent
    /// Default: 1 second
    pub timeout: Duration,

    /// Outgoing interface for the multicast probe, `None` for the OS default
    /// Default: None
    pub network_interface: Option<NetworkInterface>,

    /// Multicast TTL of the probe
    /// Default: 2
    pub multicast_ttl: u32,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            multicast_address: DEFAULT_MULTICAST_ADDRESS,
            port: DEFAULT_SSDP_PORT,
            timeout: Duration::from_secs(1),
            network_interface: None,
            multicast_ttl: 2,
        }
    }
}

impl DiscoveryConfig {
    /// Create a new DiscoveryConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with the interface taken from `SONOS_NETWORK_INTERFACE` when set
    pub fn from_env() -> Self {
        let network_interface = std::env::var(INTERFACE_ENV_VAR)
            .ok()
            .and_then(|value| value.parse().ok());

        Self {
            network_interface,
            ..Self::default()
        }
    }

    pub fn with_multicast_address(mut self, address: Ipv4Addr) -> Self {
        self.multicast_address = address;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_network_interface(mut self, interface: impl Into<NetworkInterface>) -> Self {
        self.network_interface = Some(interface.into());
        self
    }
}
