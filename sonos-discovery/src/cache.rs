//! Persistent cache of discovered device addresses

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{DiscoveryError, Result};
use crate::DeviceAddress;

/// Key the address list is stored under
pub const CACHE_KEY: &str = "device-addresses";

/// Key/value store the address cache persists through.
///
/// Implementations must treat `save` as an upsert. Values are opaque strings.
pub trait CacheStore: Send + Sync {
    /// Whether a value exists for `key`
    fn contains(&self, key: &str) -> bool;

    /// Value stored for `key`, `None` if absent
    fn fetch(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// Store that keeps values for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    fn fetch(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store that writes one JSON file per key into a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the user's cache directory, e.g. `~/.cache/sonos-network`
    pub fn in_user_cache_dir() -> Option<Self> {
        dirs::cache_dir().map(|dir| Self::new(dir.join("sonos-network")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl CacheStore for FileStore {
    fn contains(&self, key: &str) -> bool {
        self.path(key).is_file()
    }

    fn fetch(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DiscoveryError::CacheError(format!("Failed to read {}: {}", key, e))),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            DiscoveryError::CacheError(format!("Failed to create {}: {}", self.dir.display(), e))
        })?;

        // staged write, renamed over the old value
        let path = self.path(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)
            .and_then(|_| fs::rename(&staging, &path))
            .map_err(|e| DiscoveryError::CacheError(format!("Failed to write {}: {}", key, e)))
    }
}

#[derive(Debug, Default)]
struct CachedAddresses {
    addresses: Vec<DeviceAddress>,
    cleared: bool,
}

/// Remembered device addresses, optionally persisted through a [`CacheStore`].
///
/// The list holds no duplicates and keeps insertion order. Store failures are
/// logged and the cache carries on in memory.
pub struct AddressCache {
    store: Option<Arc<dyn CacheStore>>,
    state: Mutex<CachedAddresses>,
}

impl AddressCache {
    /// Cache persisted through `store`
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store: Some(store),
            state: Mutex::new(CachedAddresses::default()),
        }
    }

    /// Cache with no backing store
    pub fn in_memory() -> Self {
        Self {
            store: None,
            state: Mutex::new(CachedAddresses::default()),
        }
    }

    /// Known addresses. While the list is empty the store is consulted on every call.
    pub fn addresses(&self) -> Vec<DeviceAddress> {
        let mut state = self.state.lock();
        self.load(&mut state);
        state.addresses.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses().is_empty()
    }

    /// Remember an address. Returns `false` if it was already known.
    pub fn add(&self, address: DeviceAddress) -> bool {
        let mut state = self.state.lock();
        self.load(&mut state);

        if state.addresses.contains(&address) {
            return false;
        }

        debug!(%address, "Caching device address");
        state.addresses.push(address);
        self.persist(&state.addresses);
        true
    }

    /// Forget every address, persisting the empty list
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.addresses.clear();
        state.cleared = true;
        self.persist(&state.addresses);
    }

    fn load(&self, state: &mut CachedAddresses) {
        if state.cleared || !state.addresses.is_empty() {
            return;
        }

        let Some(store) = &self.store else {
            return;
        };

        let stored = match store.fetch(CACHE_KEY) {
            Ok(Some(stored)) => stored,
            Ok(None) => return,
            Err(e) => {
                warn!("Failed to load cached device addresses: {}", e);
                return;
            }
        };

        match serde_json::from_str::<Vec<DeviceAddress>>(&stored) {
            Ok(addresses) => {
                for address in addresses {
                    if !state.addresses.contains(&address) {
                        state.addresses.push(address);
                    }
                }
                debug!(count = state.addresses.len(), "Loaded cached device addresses");
            }
            Err(e) => warn!("Ignoring malformed device address cache: {}", e),
        }
    }

    fn persist(&self, addresses: &[DeviceAddress]) {
        let Some(store) = &self.store else {
            return;
        };

        let result = serde_json::to_string(addresses)
            .map_err(|e| DiscoveryError::CacheError(e.to_string()))
            .and_then(|json| store.save(CACHE_KEY, &json));

        if let Err(e) = result {
            warn!("Failed to persist device addresses: {}", e);
        }
    }
}

impl Default for AddressCache {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for AddressCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressCache")
            .field("persistent", &self.store.is_some())
            .field("addresses", &self.state.lock().addresses)
            .finish()
    }
}
