//! In-process zone player household for integration tests
//!
//! `FakeDevice` answers every address through the [`Transport`] seam. It
//! keeps containers with real UpdateID bookkeeping: a mutation presenting
//! anything but the current UpdateID is rejected with fault 800.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use quick_xml::escape::escape;
use sonos_api::{ApiError, Service, Transport};
use sonos_network::{parse_didl, Network, SpeakerHandle};
use xmltree::{Element, XMLNode};

pub const STALE_UPDATE_ID_FAULT: u16 = 800;
pub const NO_SUCH_OBJECT_FAULT: u16 = 701;
pub const INVALID_ACTION_FAULT: u16 = 401;

pub const KITCHEN: &str = "10.0.0.3";
pub const LIVING_ROOM: &str = "10.0.0.4";
pub const BRIDGE: &str = "10.0.0.5";

const DIDL_OPEN: &str = r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/" xmlns:r="urn:schemas-rinconnetworks-com:metadata-1-0/" xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/">"#;

/// One recorded SOAP call
#[derive(Debug, Clone)]
pub struct Call {
    pub ip: String,
    pub service: Service,
    pub action: String,
    pub args: HashMap<String, String>,
}

impl Call {
    pub fn arg(&self, name: &str) -> &str {
        self.args.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn number(&self, name: &str) -> u32 {
        self.arg(name).parse().unwrap_or_else(|_| panic!("{} is not a number", name))
    }
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub uri: String,
    pub metadata: String,
}

#[derive(Debug)]
struct FakeContainer {
    title: String,
    update_id: u32,
    entries: Vec<Entry>,
}

impl FakeContainer {
    fn new(title: &str, update_id: u32) -> Self {
        Self {
            title: title.to_string(),
            update_id,
            entries: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub ip: String,
    pub model: String,
    pub room: String,
    pub group: String,
    pub coordinator: bool,
    pub in_topology: bool,
}

#[derive(Default)]
struct FakeState {
    players: Vec<Player>,
    containers: BTreeMap<String, FakeContainer>,
    calls: Vec<Call>,
    fetches: Vec<(String, String)>,
    next_playlist: u32,
    tracks_added_override: Option<u32>,
    length_change_override: Option<i32>,
}

pub struct FakeDevice {
    state: Mutex<FakeState>,
}

impl FakeDevice {
    /// A device with an empty playback queue at UpdateID 1 and no players
    pub fn new() -> Self {
        let mut state = FakeState {
            next_playlist: 1,
            ..FakeState::default()
        };
        state
            .containers
            .insert("Q:0".to_string(), FakeContainer::new("Queue", 1));

        Self {
            state: Mutex::new(state),
        }
    }

    /// Kitchen (coordinator) and Living Room grouped together, plus a bridge
    pub fn household() -> Arc<Self> {
        let fake = Self::new();
        fake.add_player(KITCHEN, "S18", "Kitchen", "RINCON_A:1", true);
        fake.add_player(LIVING_ROOM, "S14", "Living Room", "RINCON_A:1", false);
        fake.add_player(BRIDGE, "ZB100", "Bridge", "RINCON_C:3", true);
        fake.hide_from_topology(BRIDGE);
        Arc::new(fake)
    }

    pub fn add_player(&self, ip: &str, model: &str, room: &str, group: &str, coordinator: bool) {
        self.state.lock().players.push(Player {
            ip: ip.to_string(),
            model: model.to_string(),
            room: room.to_string(),
            group: group.to_string(),
            coordinator,
            in_topology: true,
        });
    }

    pub fn players(&self) -> Vec<Player> {
        self.state.lock().players.clone()
    }

    pub fn hide_from_topology(&self, ip: &str) {
        self.with_player(ip, |player| player.in_topology = false);
    }

    pub fn regroup(&self, ip: &str, group: &str, coordinator: bool) {
        self.with_player(ip, |player| {
            player.group = group.to_string();
            player.coordinator = coordinator;
        });
    }

    fn with_player(&self, ip: &str, update: impl FnOnce(&mut Player)) {
        let mut state = self.state.lock();
        let player = state
            .players
            .iter_mut()
            .find(|player| player.ip == ip)
            .unwrap_or_else(|| panic!("no player at {}", ip));
        update(player);
    }

    /// Replace the entries of `object_id`, creating the container if needed
    pub fn seed(&self, object_id: &str, uris: &[&str]) {
        let mut state = self.state.lock();
        let container = state
            .containers
            .entry(object_id.to_string())
            .or_insert_with(|| FakeContainer::new(object_id, 1));
        container.entries = uris
            .iter()
            .map(|uri| Entry {
                uri: uri.to_string(),
                metadata: String::new(),
            })
            .collect();
    }

    /// Create a saved queue holding `uris`, returning its id
    pub fn add_playlist(&self, title: &str, uris: &[&str]) -> String {
        let id = {
            let mut state = self.state.lock();
            let id = format!("SQ:{}", state.next_playlist);
            state.next_playlist += 1;
            state.containers.insert(id.clone(), FakeContainer::new(title, 1));
            id
        };
        self.seed(&id, uris);
        id
    }

    pub fn set_update_id(&self, object_id: &str, update_id: u32) {
        if let Some(container) = self.state.lock().containers.get_mut(object_id) {
            container.update_id = update_id;
        }
    }

    /// Simulate a write by another controller
    pub fn bump_update_id(&self, object_id: &str) {
        if let Some(container) = self.state.lock().containers.get_mut(object_id) {
            container.update_id += 1;
        }
    }

    pub fn update_id_of(&self, object_id: &str) -> u32 {
        self.state.lock().containers[object_id].update_id
    }

    pub fn entries(&self, object_id: &str) -> Vec<Entry> {
        self.state.lock().containers[object_id].entries.clone()
    }

    pub fn uris(&self, object_id: &str) -> Vec<String> {
        self.entries(object_id).into_iter().map(|entry| entry.uri).collect()
    }

    pub fn has_container(&self, object_id: &str) -> bool {
        self.state.lock().containers.contains_key(object_id)
    }

    /// Report this NumTracksAdded regardless of what was added
    pub fn report_tracks_added(&self, count: u32) {
        self.state.lock().tracks_added_override = Some(count);
    }

    /// Report this QueueLengthChange regardless of what was removed
    pub fn report_length_change(&self, change: i32) {
        self.state.lock().length_change_override = Some(change);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn calls_to(&self, action: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.action == action)
            .collect()
    }

    pub fn actions(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.action).collect()
    }

    pub fn fetch_count(&self, path: &str) -> usize {
        self.state
            .lock()
            .fetches
            .iter()
            .filter(|(_, fetched)| fetched == path)
            .count()
    }

    pub fn clear_calls(&self) {
        let mut state = self.state.lock();
        state.calls.clear();
        state.fetches.clear();
    }
}

impl Transport for FakeDevice {
    fn call(&self, ip: &str, service: Service, action: &str, payload: &str) -> sonos_api::Result<Element> {
        let args = parse_args(payload)?;
        let mut state = self.state.lock();
        state.calls.push(Call {
            ip: ip.to_string(),
            service,
            action: action.to_string(),
            args: args.clone(),
        });

        let expected_service = match action {
            "Browse" | "DestroyObject" => Service::ContentDirectory,
            _ => Service::AVTransport,
        };
        if service != expected_service {
            return Err(ApiError::SoapFault(INVALID_ACTION_FAULT));
        }

        match action {
            "Browse" => state.browse(&args),
            "AddMultipleURIsToQueue" => state.add_to_queue(&args),
            "AddURIToSavedQueue" => state.add_to_saved_queue(&args),
            "ReorderTracksInSavedQueue" => state.reorder(&args),
            "CreateSavedQueue" => state.create_saved_queue(&args),
            "DestroyObject" => state.destroy(&args),
            _ => Err(ApiError::SoapFault(INVALID_ACTION_FAULT)),
        }
    }

    fn fetch(&self, ip: &str, path: &str) -> sonos_api::Result<String> {
        let mut state = self.state.lock();
        state.fetches.push((ip.to_string(), path.to_string()));

        let player = state
            .players
            .iter()
            .find(|player| player.ip == ip)
            .ok_or_else(|| ApiError::NetworkError(format!("{} is unreachable", ip)))?;

        match path {
            "/status/topology" => Ok(topology_document(&state.players)),
            "/xml/device_description.xml" => Ok(description_document(player)),
            _ => Err(ApiError::NetworkError(format!("404 for {}", path))),
        }
    }
}

impl FakeState {
    fn checked(&mut self, object_id: &str, args: &HashMap<String, String>) -> sonos_api::Result<&mut FakeContainer> {
        let presented: u32 = number(args, "UpdateID")?;
        let container = self
            .containers
            .get_mut(object_id)
            .ok_or(ApiError::SoapFault(NO_SUCH_OBJECT_FAULT))?;
        if presented != container.update_id {
            return Err(ApiError::SoapFault(STALE_UPDATE_ID_FAULT));
        }
        Ok(container)
    }

    fn browse(&mut self, args: &HashMap<String, String>) -> sonos_api::Result<Element> {
        let object_id = arg(args, "ObjectID");
        let start: usize = number(args, "StartingIndex")?;
        let count: usize = number(args, "RequestedCount")?;

        if object_id == "SQ:" {
            let playlists: Vec<String> = self
                .containers
                .iter()
                .filter(|(id, _)| id.starts_with("SQ:"))
                .map(|(id, container)| container_didl(id, &container.title))
                .collect();
            let page: Vec<String> = playlists.iter().skip(start).take(count).cloned().collect();
            return Ok(browse_response(&page, playlists.len(), 1));
        }

        let container = self
            .containers
            .get(object_id)
            .ok_or(ApiError::SoapFault(NO_SUCH_OBJECT_FAULT))?;

        if arg(args, "BrowseFlag") == "BrowseMetadata" {
            let didl = container_didl(object_id, &container.title);
            return Ok(browse_response(&[didl], 1, container.update_id));
        }

        let page: Vec<String> = container
            .entries
            .iter()
            .enumerate()
            .skip(start)
            .take(count)
            .map(|(index, entry)| item_didl(object_id, index, entry))
            .collect();
        Ok(browse_response(&page, container.entries.len(), container.update_id))
    }

    fn add_to_queue(&mut self, args: &HashMap<String, String>) -> sonos_api::Result<Element> {
        let reported = self.tracks_added_override;
        let enqueued = arg(args, "EnqueuedURIs");
        let uris: Vec<&str> = if number::<u32>(args, "NumberOfURIs")? == 1 {
            vec![enqueued]
        } else {
            enqueued.split(' ').collect()
        };
        let metadata = arg(args, "EnqueuedURIsMetaData");
        let desired: usize = number(args, "DesiredFirstTrackNumberEnqueued")?;

        let container = self.checked("Q:0", args)?;
        let length = container.entries.len();
        let index = if desired == 0 { length } else { (desired - 1).min(length) };
        for (offset, uri) in uris.iter().enumerate() {
            container.entries.insert(
                index + offset,
                Entry {
                    uri: uri.to_string(),
                    metadata: metadata.to_string(),
                },
            );
        }
        container.update_id += 1;

        Ok(response(
            "AddMultipleURIsToQueue",
            &[
                ("FirstTrackNumberEnqueued", (index + 1).to_string()),
                ("NumTracksAdded", reported.unwrap_or(uris.len() as u32).to_string()),
                ("NewQueueLength", container.entries.len().to_string()),
                ("NewUpdateID", container.update_id.to_string()),
            ],
        ))
    }

    fn add_to_saved_queue(&mut self, args: &HashMap<String, String>) -> sonos_api::Result<Element> {
        let reported = self.tracks_added_override;
        let index: usize = number(args, "AddAtIndex")?;
        let entry = Entry {
            uri: arg(args, "EnqueuedURI").to_string(),
            metadata: arg(args, "EnqueuedURIMetaData").to_string(),
        };

        let container = self.checked(arg(args, "ObjectID"), args)?;
        let index = index.min(container.entries.len());
        container.entries.insert(index, entry);
        container.update_id += 1;

        Ok(response(
            "AddURIToSavedQueue",
            &[
                ("NumTracksAdded", reported.unwrap_or(1).to_string()),
                ("NewQueueLength", container.entries.len().to_string()),
                ("NewUpdateID", container.update_id.to_string()),
            ],
        ))
    }

    fn reorder(&mut self, args: &HashMap<String, String>) -> sonos_api::Result<Element> {
        let reported = self.length_change_override;
        let tracks = positions(arg(args, "TrackList"))?;
        let targets = positions(arg(args, "NewPositionList"))?;

        let container = self.checked(arg(args, "ObjectID"), args)?;
        let before = container.entries.len() as i32;

        if targets.is_empty() {
            let mut doomed = tracks;
            doomed.sort_unstable();
            doomed.dedup();
            for index in doomed.into_iter().rev() {
                if index < container.entries.len() {
                    container.entries.remove(index);
                }
            }
        } else {
            for (&from, &to) in tracks.iter().zip(&targets) {
                if from < container.entries.len() {
                    let entry = container.entries.remove(from);
                    let to = to.min(container.entries.len());
                    container.entries.insert(to, entry);
                }
            }
        }
        container.update_id += 1;

        let change = container.entries.len() as i32 - before;
        Ok(response(
            "ReorderTracksInSavedQueue",
            &[
                ("QueueLengthChange", reported.unwrap_or(change).to_string()),
                ("NewQueueLength", container.entries.len().to_string()),
                ("NewUpdateID", container.update_id.to_string()),
            ],
        ))
    }

    fn create_saved_queue(&mut self, args: &HashMap<String, String>) -> sonos_api::Result<Element> {
        let id = format!("SQ:{}", self.next_playlist);
        self.next_playlist += 1;

        let mut container = FakeContainer::new(arg(args, "Title"), 1);
        let uri = arg(args, "EnqueuedURI");
        if !uri.is_empty() {
            container.entries.push(Entry {
                uri: uri.to_string(),
                metadata: arg(args, "EnqueuedURIMetaData").to_string(),
            });
        }
        let fields = [
            ("NumTracksAdded", container.entries.len().to_string()),
            ("NewQueueLength", container.entries.len().to_string()),
            ("AssignedObjectID", id.clone()),
            ("NewUpdateID", container.update_id.to_string()),
        ];
        self.containers.insert(id, container);

        Ok(response("CreateSavedQueue", &fields))
    }

    fn destroy(&mut self, args: &HashMap<String, String>) -> sonos_api::Result<Element> {
        self.containers
            .remove(arg(args, "ObjectID"))
            .ok_or(ApiError::SoapFault(NO_SUCH_OBJECT_FAULT))?;
        Ok(response("DestroyObject", &[]))
    }
}

/// Network over `fake` with every player's address cached
pub fn network(fake: &Arc<FakeDevice>) -> Network {
    let network = Network::builder()
        .in_memory_cache()
        .with_transport(fake.clone())
        .build();
    for player in fake.players() {
        network.directory().add_address(player.ip.as_str());
    }
    network
}

/// The household's Kitchen speaker, coordinator of the main group
pub fn kitchen(network: &Network) -> SpeakerHandle {
    network
        .speaker_by_room("Kitchen")
        .expect("speakers resolve")
        .expect("kitchen exists")
}

fn parse_args(payload: &str) -> sonos_api::Result<HashMap<String, String>> {
    let root = Element::parse(format!("<args>{}</args>", payload).as_bytes())
        .map_err(|e| ApiError::ParseError(e.to_string()))?;

    Ok(root
        .children
        .iter()
        .filter_map(XMLNode::as_element)
        .map(|child| {
            let text = child.get_text().map(|text| text.into_owned()).unwrap_or_default();
            (child.name.clone(), text)
        })
        .collect())
}

fn arg<'a>(args: &'a HashMap<String, String>, name: &str) -> &'a str {
    args.get(name).map(String::as_str).unwrap_or_default()
}

fn number<T: std::str::FromStr>(args: &HashMap<String, String>, name: &str) -> sonos_api::Result<T> {
    arg(args, name)
        .parse()
        .map_err(|_| ApiError::SoapFault(402))
}

fn positions(list: &str) -> sonos_api::Result<Vec<usize>> {
    if list.is_empty() {
        return Ok(Vec::new());
    }
    list.split(',')
        .map(|position| position.trim().parse().map_err(|_| ApiError::SoapFault(402)))
        .collect()
}

fn response(action: &str, fields: &[(&str, String)]) -> Element {
    let mut root = Element::new(&format!("{}Response", action));
    for (name, value) in fields {
        let mut child = Element::new(name);
        child.children.push(XMLNode::Text(value.clone()));
        root.children.push(XMLNode::Element(child));
    }
    root
}

fn browse_response(didl: &[String], total: usize, update_id: u32) -> Element {
    response(
        "Browse",
        &[
            ("Result", format!("{}{}</DIDL-Lite>", DIDL_OPEN, didl.concat())),
            ("NumberReturned", didl.len().to_string()),
            ("TotalMatches", total.to_string()),
            ("UpdateID", update_id.to_string()),
        ],
    )
}

fn container_didl(id: &str, title: &str) -> String {
    format!(
        r#"<container id="{}" parentID="SQ:" restricted="true"><dc:title>{}</dc:title><upnp:class>object.container.playlistContainer</upnp:class></container>"#,
        escape(id),
        escape(title)
    )
}

fn item_didl(parent: &str, index: usize, entry: &Entry) -> String {
    let title = parse_didl(&entry.metadata)
        .ok()
        .and_then(|listing| listing.tracks.into_iter().next())
        .and_then(|track| track.title)
        .map(|title| format!("<dc:title>{}</dc:title>", escape(&title)))
        .unwrap_or_default();

    format!(
        r#"<item id="{parent}/{}" parentID="{parent}" restricted="true"><res>{}</res>{title}<upnp:class>object.item.audioItem.musicTrack</upnp:class></item>"#,
        index + 1,
        escape(&entry.uri)
    )
}

fn topology_document(players: &[Player]) -> String {
    let records: String = players
        .iter()
        .filter(|player| player.in_topology)
        .map(|player| {
            format!(
                r#"<ZonePlayer group="{}" coordinator="{}" wirelessmode="0" uuid="RINCON_{}" location="http://{}:1400/xml/device_description.xml" version="79.1-55010">{}</ZonePlayer>"#,
                player.group,
                player.coordinator,
                player.ip.replace('.', ""),
                player.ip,
                escape(&player.room)
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><ZPSupportInfo><ZonePlayers>{}</ZonePlayers></ZPSupportInfo>"#,
        records
    )
}

fn description_document(player: &Player) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <device>
    <deviceType>urn:schemas-upnp-org:device:ZonePlayer:1</deviceType>
    <friendlyName>{ip} - Sonos</friendlyName>
    <manufacturer>Sonos, Inc.</manufacturer>
    <modelNumber>{model}</modelNumber>
    <UDN>uuid:RINCON_{uuid}</UDN>
    <roomName>{room}</roomName>
  </device>
</root>"#,
        ip = player.ip,
        model = player.model,
        uuid = player.ip.replace('.', ""),
        room = escape(&player.room)
    )
}
