//! # Sonos Network
//!
//! Find the zone players on the local network, learn how they are grouped
//! and edit their queues and saved playlists.
//!
//! ```rust,no_run
//! use sonos_network::{Network, Stream};
//!
//! let network = Network::new();
//! for controller in network.controllers()? {
//!     let queue = network.queue(&controller);
//!     println!("{}: {} entries", controller.room(), queue.len()?);
//! }
//!
//! let kitchen = network.speaker_by_room("Kitchen")?.ok_or(sonos_network::SonosError::NoDevicesFound)?;
//! let playlist = network.create_playlist(&kitchen, "Radio")?;
//! playlist.append(&[Stream::new("x-sonosapi-stream:s44255", "BBC Radio 6")])?;
//! # Ok::<(), sonos_network::SonosError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Network
//!     ↓
//! DeviceDirectory ── AddressCache ← Discovery (SSDP)
//!     ↓
//! TopologyResolver (/status/topology)
//!     ↓
//! Queue / Playlist (UpdateID-checked AVTransport + ContentDirectory calls)
//! ```
//!
//! Every queue mutation presents the container's last observed UpdateID and
//! adopts the one the device answers with. Reported effects are checked; a
//! mismatch surfaces as [`SonosError::QueueDesync`] and nothing is retried.

pub mod logging;

mod device;
mod directory;
mod error;
mod network;
mod playlist;
mod queue;
mod speaker;
mod topology;
mod track;

pub use device::{speaker_model_name, DeviceHandle};
pub use directory::DeviceDirectory;
pub use error::{Result, SonosError};
pub use network::{Network, NetworkBuilder, PLAYLISTS_OBJECT_ID};
pub use playlist::Playlist;
pub use queue::{Queue, QueueState, QueueTarget, PAGE_SIZE};
pub use speaker::SpeakerHandle;
pub use topology::{parse_topology, SpeakerMap, TopologyEntry, TopologyResolver, TOPOLOGY_PATH};
pub use track::{parse_didl, Container, DidlListing, Stream, Track, UriItem};

// Re-export the lower layers callers need to configure a network
pub use sonos_api::{ApiError, SonosClient, Transport};
pub use sonos_discovery::{
    AddressCache, CacheStore, DeviceAddress, Discovery, DiscoveryConfig, DiscoveryError,
    FileStore, MemoryStore, NetworkInterface,
};
