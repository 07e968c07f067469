//! Entry point tying discovery, topology and queues together

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use sonos_api::services::av_transport::{CreateSavedQueueOperation, CreateSavedQueueOperationRequest};
use sonos_api::services::content_directory::{BrowseOperation, BrowseOperationRequest};
use sonos_api::{SonosClient, Transport};
use sonos_discovery::{
    AddressCache, CacheStore, DeviceAddress, Discovery, DiscoveryConfig, FileStore,
};
use tracing::{debug, info, warn};

use crate::device::DeviceHandle;
use crate::directory::DeviceDirectory;
use crate::error::{Result, SonosError};
use crate::playlist::Playlist;
use crate::queue::{Queue, QueueTarget, SharedQueueState, PAGE_SIZE};
use crate::speaker::SpeakerHandle;
use crate::topology::TopologyResolver;
use crate::track::parse_didl;

/// Object id of the saved queue container
pub const PLAYLISTS_OBJECT_ID: &str = "SQ:";

/// Playback queues belong to one controller. Saved queues are shared by
/// the household, so their state is keyed by id alone.
type StateKey = (Option<DeviceAddress>, QueueTarget);

/// A Sonos household
///
/// # Example
/// ```rust,no_run
/// use sonos_network::{Network, Track};
///
/// let network = Network::new();
/// let controller = network.speaker_by_room("Kitchen")?.expect("no kitchen");
/// let queue = network.queue(&network.controller_for(&controller)?);
///
/// queue.append(&[Track::new("x-file-cifs://nas/music/track.flac")])?;
/// for track in queue.tracks()? {
///     println!("{}", track.title.unwrap_or(track.uri));
/// }
/// # Ok::<(), sonos_network::SonosError>(())
/// ```
pub struct Network {
    directory: DeviceDirectory,
    topology: TopologyResolver,
    queues: Mutex<HashMap<StateKey, SharedQueueState>>,
}

impl Network {
    /// Network with a file-backed address cache and settings from the
    /// environment
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::default()
    }

    pub fn directory(&self) -> &DeviceDirectory {
        &self.directory
    }

    pub fn topology(&self) -> &TopologyResolver {
        &self.topology
    }

    /// Every known device, discovering when the cache is empty
    pub fn devices(&self) -> Result<Vec<DeviceHandle>> {
        self.directory.devices()
    }

    /// Every speaker with its topology
    pub fn speakers(&self) -> Result<Vec<SpeakerHandle>> {
        let devices = self.directory.devices()?;
        let speakers = self.topology.resolve(&devices)?;
        Ok(speakers.values().cloned().collect())
    }

    /// Forget the resolved topology so the next lookup fetches it again
    pub fn clear_topology(&self) {
        self.topology.invalidate();
    }

    /// Forget cached addresses and the topology built from them
    pub fn clear_devices(&self) {
        self.directory.clear();
        self.topology.invalidate();
    }

    /// Group coordinators, one per group
    pub fn controllers(&self) -> Result<Vec<SpeakerHandle>> {
        Ok(self
            .speakers()?
            .into_iter()
            .filter(SpeakerHandle::is_coordinator)
            .collect())
    }

    /// Coordinator of the group `speaker` plays in
    pub fn controller_for(&self, speaker: &SpeakerHandle) -> Result<SpeakerHandle> {
        if speaker.is_coordinator() {
            return Ok(speaker.clone());
        }

        self.speakers()?
            .into_iter()
            .find(|candidate| candidate.is_coordinator() && candidate.group() == speaker.group())
            .ok_or_else(|| SonosError::NoCoordinator {
                group: speaker.group().to_string(),
            })
    }

    /// First speaker in the room named `room`
    pub fn speaker_by_room(&self, room: &str) -> Result<Option<SpeakerHandle>> {
        Ok(self
            .speakers()?
            .into_iter()
            .find(|speaker| speaker.room() == room))
    }

    /// Playback queue of `controller`
    pub fn queue(&self, controller: &SpeakerHandle) -> Queue {
        let key = (Some(controller.address().clone()), QueueTarget::Queue);
        Queue::with_state(controller.clone(), QueueTarget::Queue, self.state_for(key))
    }

    /// Saved queue `id`, operated through `controller`
    pub fn playlist(&self, controller: &SpeakerHandle, id: &str) -> Playlist {
        self.playlist_handle(controller, id, None)
    }

    /// All saved queues of the household
    pub fn playlists(&self, controller: &SpeakerHandle) -> Result<Vec<Playlist>> {
        let mut playlists = Vec::new();

        loop {
            let start = playlists.len() as u32;
            let request = BrowseOperationRequest::direct_children(PLAYLISTS_OBJECT_ID, start, PAGE_SIZE);
            let page = controller.execute::<BrowseOperation>(&request)?;
            let containers = parse_didl(&page.result)?.containers;
            if containers.is_empty() {
                break;
            }

            for container in containers {
                if container.id.is_empty() {
                    warn!("Skipping saved queue without an id");
                    continue;
                }
                playlists.push(self.playlist_handle(controller, &container.id, Some(container.title)));
            }
            if playlists.len() as u32 >= page.total_matches {
                break;
            }
        }

        debug!(count = playlists.len(), "Listed playlists");
        Ok(playlists)
    }

    /// Saved queue titled `name`, if any
    pub fn playlist_by_name(&self, controller: &SpeakerHandle, name: &str) -> Result<Option<Playlist>> {
        for playlist in self.playlists(controller)? {
            if playlist.name()? == name {
                return Ok(Some(playlist));
            }
        }
        Ok(None)
    }

    /// Create an empty saved queue
    pub fn create_playlist(&self, controller: &SpeakerHandle, name: &str) -> Result<Playlist> {
        let request = CreateSavedQueueOperationRequest {
            instance_id: 0,
            title: name.to_string(),
            enqueued_uri: String::new(),
            enqueued_uri_metadata: String::new(),
        };
        let response = controller.execute::<CreateSavedQueueOperation>(&request)?;
        info!(id = %response.assigned_object_id, name, "Created playlist");

        Ok(self.playlist_handle(controller, &response.assigned_object_id, Some(name.to_string())))
    }

    fn playlist_handle(&self, controller: &SpeakerHandle, id: &str, name: Option<String>) -> Playlist {
        let state = self.state_for((None, QueueTarget::playlist(id)));
        Playlist::with_state(controller.clone(), id, name, state)
    }

    fn state_for(&self, key: StateKey) -> SharedQueueState {
        Arc::clone(self.queues.lock().entry(key).or_default())
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Network`]
#[derive(Default)]
pub struct NetworkBuilder {
    store: Option<Arc<dyn CacheStore>>,
    in_memory: bool,
    discovery: Option<DiscoveryConfig>,
    client: Option<SonosClient>,
}

impl NetworkBuilder {
    /// Persist known addresses in `store`
    pub fn with_cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Keep known addresses for this process only
    pub fn in_memory_cache(mut self) -> Self {
        self.in_memory = true;
        self
    }

    pub fn with_discovery_config(mut self, config: DiscoveryConfig) -> Self {
        self.discovery = Some(config);
        self
    }

    pub fn with_client(mut self, client: SonosClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Talk to devices through `transport` instead of HTTP
    pub fn with_transport(self, transport: Arc<dyn Transport>) -> Self {
        self.with_client(SonosClient::with_transport(transport))
    }

    pub fn build(self) -> Network {
        let cache = match (self.store, self.in_memory) {
            (_, true) => AddressCache::in_memory(),
            (Some(store), false) => AddressCache::new(store),
            (None, false) => match FileStore::in_user_cache_dir() {
                Some(store) => AddressCache::new(Arc::new(store)),
                None => {
                    warn!("No user cache directory, device addresses will not persist");
                    AddressCache::in_memory()
                }
            },
        };

        let discovery = Discovery::new(self.discovery.unwrap_or_else(DiscoveryConfig::from_env));
        let client = self.client.unwrap_or_default();

        Network {
            directory: DeviceDirectory::new(Arc::new(cache), discovery, client),
            topology: TopologyResolver::new(),
            queues: Mutex::new(HashMap::new()),
        }
    }
}

impl std::fmt::Debug for NetworkBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkBuilder")
            .field("custom_store", &self.store.is_some())
            .field("in_memory", &self.in_memory)
            .field("discovery", &self.discovery)
            .field("client", &self.client)
            .finish()
    }
}
