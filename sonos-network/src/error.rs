use sonos_discovery::{DeviceAddress, DiscoveryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SonosError {
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("API error: {0}")]
    Api(#[from] sonos_api::ApiError),

    #[error("No devices found on the network")]
    NoDevicesFound,

    /// A speaker has no record in the topology document
    #[error("Speaker {address} is missing from the network topology")]
    TopologyMismatch { address: DeviceAddress },

    #[error("No coordinator found for group {group}")]
    NoCoordinator { group: String },

    /// A mutation's reported effect differs from the requested one.
    ///
    /// The local queue state can no longer be trusted; re-read it before
    /// trying again.
    #[error("{action} reported {reported}, expected {expected}")]
    QueueDesync {
        action: &'static str,
        expected: i64,
        reported: i64,
    },

    #[error("Position {position} is out of range for a queue of length {length}")]
    InvalidPosition { position: u32, length: u32 },

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, SonosError>;
