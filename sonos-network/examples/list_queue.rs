//! Print every group's queue and the household's saved playlists.
//!
//! ```sh
//! SONOS_NETWORK_LOG_MODE=development cargo run -p sonos-network --example list_queue
//! ```

use sonos_network::logging::init_logging_from_env;
use sonos_network::Network;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging_from_env()?;

    let network = Network::new();
    let controllers = network.controllers()?;

    for controller in &controllers {
        let queue = network.queue(controller);
        let tracks = queue.tracks()?;
        println!("{} ({} entries, update id {})", controller.room(), tracks.len(), queue.update_id()?);

        for (position, track) in tracks.iter().enumerate() {
            let title = track.title.as_deref().unwrap_or(&track.uri);
            match &track.artist {
                Some(artist) => println!("  {:>3}. {} - {}", position, artist, title),
                None => println!("  {:>3}. {}", position, title),
            }
        }
    }

    if let Some(controller) = controllers.first() {
        println!();
        for playlist in network.playlists(controller)? {
            println!("{} {}", playlist.id(), playlist.name()?);
        }
    }

    Ok(())
}
