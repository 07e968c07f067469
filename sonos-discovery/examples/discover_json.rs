//! Zone player discovery that outputs JSON for scripting
//!
//! Usage: cargo run -p sonos-network-discovery --example discover_json [timeout_ms]

use std::time::Duration;

use sonos_discovery::{AddressCache, Discovery, DiscoveryConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let timeout = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1000);

    let config = DiscoveryConfig::from_env().with_timeout(Duration::from_millis(timeout));
    let cache = AddressCache::in_memory();
    let addresses = Discovery::new(config).discover(&cache)?;

    println!("{}", serde_json::to_string_pretty(&addresses)?);
    Ok(())
}
