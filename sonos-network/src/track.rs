//! Queue items and DIDL-Lite metadata
//!
//! Anything with a URI can be queued. The metadata string travels alongside
//! the URI so the device can show titles without resolving the URI itself.

use std::borrow::Cow;

use quick_xml::escape::escape;
use xmltree::{Element, XMLNode};

use crate::error::{Result, SonosError};

const DIDL_OPEN: &str = concat!(
    r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/""#,
    r#" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/""#,
    r#" xmlns:r="urn:schemas-rinconnetworks-com:metadata-1-0/""#,
    r#" xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/">"#,
);
const DIDL_CLOSE: &str = "</DIDL-Lite>";

const MUSIC_TRACK_CLASS: &str = "object.item.audioItem.musicTrack";
const BROADCAST_CLASS: &str = "object.item.audioItem.audioBroadcast";

/// Something that can be put in a queue
pub trait UriItem {
    fn uri(&self) -> &str;

    /// DIDL-Lite metadata sent with the URI, empty when there is none
    fn metadata(&self) -> String;
}

impl<T: UriItem + ?Sized> UriItem for &T {
    fn uri(&self) -> &str {
        (**self).uri()
    }

    fn metadata(&self) -> String {
        (**self).metadata()
    }
}

impl<T: UriItem + ?Sized> UriItem for Box<T> {
    fn uri(&self) -> &str {
        (**self).uri()
    }

    fn metadata(&self) -> String {
        (**self).metadata()
    }
}

/// A single queue entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    pub uri: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_art: Option<String>,
    /// Number of the track on its album
    pub number: Option<u32>,
    /// Object id the device gave this entry, e.g. "Q:0/3"
    pub item_id: Option<String>,
}

impl Track {
    /// A bare track; the device looks up the metadata itself
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_album_art(mut self, album_art: impl Into<String>) -> Self {
        self.album_art = Some(album_art.into());
        self
    }

    pub fn with_number(mut self, number: u32) -> Self {
        self.number = Some(number);
        self
    }

    fn has_details(&self) -> bool {
        self.title.is_some()
            || self.artist.is_some()
            || self.album.is_some()
            || self.album_art.is_some()
            || self.number.is_some()
    }

    fn from_element(item: &Element) -> Self {
        Self {
            uri: child_text(item, "res").unwrap_or_default(),
            title: child_text(item, "title"),
            artist: child_text(item, "creator"),
            album: child_text(item, "album"),
            album_art: child_text(item, "albumArtURI"),
            number: child_text(item, "originalTrackNumber").and_then(|n| n.parse().ok()),
            item_id: item.attributes.get("id").cloned(),
        }
    }
}

impl UriItem for Track {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn metadata(&self) -> String {
        if !self.has_details() {
            return String::new();
        }

        let mut body = String::new();
        push_tag(&mut body, "res", Some(&self.uri));
        push_tag(&mut body, "upnp:albumArtURI", self.album_art.as_deref());
        push_tag(&mut body, "dc:title", self.title.as_deref());
        push_tag(&mut body, "upnp:class", Some(MUSIC_TRACK_CLASS));
        push_tag(&mut body, "dc:creator", self.artist.as_deref());
        push_tag(&mut body, "upnp:album", self.album.as_deref());
        let number = self.number.map(|n| n.to_string());
        push_tag(&mut body, "upnp:originalTrackNumber", number.as_deref());

        didl_item(self.item_id.as_deref().unwrap_or("-1"), &body)
    }
}

/// A radio stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    uri: String,
    name: String,
}

impl Stream {
    /// URI scheme of streams served through the Sonos radio service
    pub const PREFIX: &'static str = "x-sonosapi-stream";

    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl UriItem for Stream {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn metadata(&self) -> String {
        let title = if self.name.is_empty() { "Stream" } else { &self.name };

        let mut body = String::new();
        push_tag(&mut body, "dc:title", Some(title));
        push_tag(&mut body, "upnp:class", Some(BROADCAST_CLASS));
        body.push_str(
            r#"<desc id="cdudn" nameSpace="urn:schemas-rinconnetworks-com:metadata-1-0/">SA_RINCON65031_</desc>"#,
        );

        didl_item("-1", &body)
    }
}

/// A container in a browse result, such as a saved queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub id: String,
    pub title: String,
}

/// Entries of a DIDL-Lite browse result
#[derive(Debug, Default)]
pub struct DidlListing {
    pub tracks: Vec<Track>,
    pub containers: Vec<Container>,
}

/// Parse the `Result` document of a browse response
///
/// An empty document is an empty listing.
pub fn parse_didl(didl: &str) -> Result<DidlListing> {
    let mut listing = DidlListing::default();
    if didl.trim().is_empty() {
        return Ok(listing);
    }

    let root = Element::parse(didl.as_bytes())
        .map_err(|e| SonosError::Parse(format!("Invalid DIDL-Lite: {}", e)))?;

    for element in root.children.iter().filter_map(XMLNode::as_element) {
        match element.name.as_str() {
            "item" => listing.tracks.push(Track::from_element(element)),
            "container" => listing.containers.push(Container {
                id: element.attributes.get("id").cloned().unwrap_or_default(),
                title: child_text(element, "title").unwrap_or_default(),
            }),
            _ => {}
        }
    }

    Ok(listing)
}

fn child_text(element: &Element, name: &str) -> Option<String> {
    element
        .get_child(name)
        .and_then(Element::get_text)
        .map(Cow::into_owned)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn push_tag(body: &mut String, tag: &str, value: Option<&str>) {
    if let Some(value) = value {
        body.push_str(&format!("<{tag}>{}</{tag}>", escape(value)));
    }
}

fn didl_item(id: &str, body: &str) -> String {
    format!(
        r#"{DIDL_OPEN}<item id="{}" parentID="-1" restricted="true">{body}</item>{DIDL_CLOSE}"#,
        escape(id)
    )
}
