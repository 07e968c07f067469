//! Queue mutation under UpdateID concurrency control
//!
//! Every container on a zone player carries an UpdateID. Each mutating
//! action must present the current value and answers with the next one,
//! which is adopted as-is. A stale value is rejected by the device, so two
//! writers can never silently overwrite each other.
//!
//! The playback queue (`Q:0`) and saved queues (`SQ:<n>`) share this
//! protocol. They differ only in the add action and in where an append
//! lands; see [`QueueTarget::append_position`].

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use sonos_api::services::av_transport::{
    AddMultipleURIsToQueueOperation, AddMultipleURIsToQueueOperationRequest,
    AddURIToSavedQueueOperation, AddURIToSavedQueueOperationRequest,
    ReorderTracksInSavedQueueOperation, ReorderTracksInSavedQueueOperationRequest,
    QUEUE_OBJECT_ID,
};
use sonos_api::services::content_directory::{
    BrowseOperation, BrowseOperationRequest, BrowseResponse,
};
use sonos_api::UPnPOperation;
use tracing::debug;

use crate::error::{Result, SonosError};
use crate::speaker::SpeakerHandle;
use crate::track::{parse_didl, Track, UriItem};

/// Entries requested per browse page
pub const PAGE_SIZE: u32 = 100;

/// The container a [`Queue`] operates on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueueTarget {
    /// The controller's playback queue
    Queue,
    /// A saved queue, identified by its object id (`SQ:<n>`)
    Playlist { id: String },
}

impl QueueTarget {
    pub fn playlist(id: impl Into<String>) -> Self {
        Self::Playlist { id: id.into() }
    }

    pub fn object_id(&self) -> &str {
        match self {
            Self::Queue => QUEUE_OBJECT_ID,
            Self::Playlist { id } => id,
        }
    }

    /// Zero-based position an append lands at, given the current length
    ///
    /// Saved queues answer appends at `length` by placing the entry before
    /// a trailing slot the device keeps, so they are addressed one lower.
    /// This mirrors observed device behavior and is not documented by the
    /// protocol.
    pub fn append_position(&self, length: u32) -> u32 {
        match self {
            Self::Queue => length,
            Self::Playlist { .. } => length.saturating_sub(1),
        }
    }
}

/// Last observed version and size of a container
#[derive(Debug, Default)]
pub struct QueueState {
    update_id: Option<u32>,
    length: u32,
}

impl QueueState {
    fn observe(&mut self, update_id: u32, length: u32) {
        self.update_id = Some(update_id);
        self.length = length;
    }
}

/// Shared handle on a container's state
///
/// Every [`Queue`] for the same container shares one of these so mutations
/// are serialized.
pub(crate) type SharedQueueState = Arc<Mutex<QueueState>>;

/// Ordered list of entries held by a zone player
///
/// Mutations against one container are serialized through its shared state
/// lock, which is held for the whole sequence of remote calls an operation
/// makes. Nothing is retried. When an operation fails part way, the entries
/// already applied stay applied.
#[derive(Debug, Clone)]
pub struct Queue {
    controller: SpeakerHandle,
    target: QueueTarget,
    state: SharedQueueState,
}

impl Queue {
    /// Handles are obtained through [`Network::queue`](crate::Network::queue)
    /// and [`Network::playlist`](crate::Network::playlist), which hand out one
    /// state per container.
    pub(crate) fn with_state(controller: SpeakerHandle, target: QueueTarget, state: SharedQueueState) -> Self {
        Self {
            controller,
            target,
            state,
        }
    }

    pub fn controller(&self) -> &SpeakerHandle {
        &self.controller
    }

    pub fn target(&self) -> &QueueTarget {
        &self.target
    }

    pub fn object_id(&self) -> &str {
        self.target.object_id()
    }

    /// Number of entries, read from the device
    pub fn len(&self) -> Result<u32> {
        let mut state = self.state.lock();
        self.sync(&mut state)?;
        Ok(state.length)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// UpdateID the next mutation will present
    ///
    /// Read from the device when nothing has been observed yet.
    pub fn update_id(&self) -> Result<u32> {
        let mut state = self.state.lock();
        self.current_update_id(&mut state)
    }

    /// Re-read the UpdateID and length from the device
    pub fn refresh(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.sync(&mut state)
    }

    /// All entries, read fresh from the device in pages of [`PAGE_SIZE`]
    pub fn tracks(&self) -> Result<Vec<Track>> {
        let mut state = self.state.lock();
        let mut tracks = Vec::new();

        loop {
            let start = tracks.len() as u32;
            let page = self.browse(&mut state, start, PAGE_SIZE)?;
            let listing = parse_didl(&page.result)?;
            if listing.tracks.is_empty() {
                break;
            }
            tracks.extend(listing.tracks);
            if tracks.len() as u32 >= page.total_matches {
                break;
            }
        }

        Ok(tracks)
    }

    /// Add `items` after the last entry, in order
    pub fn append<T: UriItem>(&self, items: &[T]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        let mut state = self.state.lock();
        self.sync(&mut state)?;
        let position = self.target.append_position(state.length);
        self.add_locked(&mut state, items, position)
    }

    /// Add `items` so the first lands at zero-based `position`
    ///
    /// # Errors
    ///
    /// [`SonosError::InvalidPosition`] when `position` is past the end.
    pub fn insert_at<T: UriItem>(&self, items: &[T], position: u32) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        let mut state = self.state.lock();
        self.sync(&mut state)?;
        if position > state.length {
            return Err(SonosError::InvalidPosition {
                position,
                length: state.length,
            });
        }
        self.add_locked(&mut state, items, position)
    }

    /// Add one item, appending when `position` is `None`
    pub fn add_track<T: UriItem>(&self, item: T, position: Option<u32>) -> Result<()> {
        self.add_tracks(&[item], position)
    }

    /// Add several items, appending when `position` is `None`
    pub fn add_tracks<T: UriItem>(&self, items: &[T], position: Option<u32>) -> Result<()> {
        match position {
            Some(position) => self.insert_at(items, position),
            None => self.append(items),
        }
    }

    /// Delete the entries at the given zero-based positions
    ///
    /// Duplicates are ignored. All positions go in one remote call.
    ///
    /// # Errors
    ///
    /// [`SonosError::InvalidPosition`] for a position past the last observed
    /// length, [`SonosError::QueueDesync`] when the device removed a
    /// different number of entries than requested.
    pub fn remove_at(&self, positions: &[u32]) -> Result<()> {
        let positions: BTreeSet<u32> = positions.iter().copied().collect();
        if positions.is_empty() {
            return Ok(());
        }

        let mut state = self.state.lock();
        let update_id = self.current_update_id(&mut state)?;
        if let Some(&position) = positions.iter().find(|&&p| p >= state.length) {
            return Err(SonosError::InvalidPosition {
                position,
                length: state.length,
            });
        }
        self.remove_locked(&mut state, update_id, &positions)
    }

    pub fn remove_track(&self, position: u32) -> Result<()> {
        self.remove_at(&[position])
    }

    /// Move the entry at `from` to `to`
    ///
    /// The device's answer is trusted; neither position is checked locally.
    pub fn move_track(&self, from: u32, to: u32) -> Result<&Self> {
        let mut state = self.state.lock();
        let update_id = self.current_update_id(&mut state)?;

        let request = ReorderTracksInSavedQueueOperationRequest::move_track(
            self.object_id(),
            update_id,
            from,
            to,
        );
        let response = self.execute::<ReorderTracksInSavedQueueOperation>(&request)?;
        state.observe(response.new_update_id, response.new_queue_length);
        debug!(object_id = self.object_id(), from, to, update_id = response.new_update_id, "Moved entry");

        Ok(self)
    }

    /// Delete every entry
    pub fn clear(&self) -> Result<&Self> {
        let mut state = self.state.lock();
        self.sync(&mut state)?;
        if state.length == 0 {
            return Ok(self);
        }

        let positions: BTreeSet<u32> = (0..state.length).collect();
        let update_id = self.current_update_id(&mut state)?;
        self.remove_locked(&mut state, update_id, &positions)?;
        Ok(self)
    }

    fn add_locked<T: UriItem>(&self, state: &mut QueueState, items: &[T], position: u32) -> Result<()> {
        for (offset, item) in items.iter().enumerate() {
            let position = position + offset as u32;
            let update_id = self.current_update_id(state)?;

            let (action, added, length, next_update_id) = match &self.target {
                QueueTarget::Queue => {
                    let request = AddMultipleURIsToQueueOperationRequest::single(
                        update_id,
                        item.uri(),
                        item.metadata(),
                        position,
                    );
                    let response = self.execute::<AddMultipleURIsToQueueOperation>(&request)?;
                    (
                        AddMultipleURIsToQueueOperation::ACTION,
                        response.num_tracks_added,
                        response.new_queue_length,
                        response.new_update_id,
                    )
                }
                QueueTarget::Playlist { id } => {
                    let request = AddURIToSavedQueueOperationRequest {
                        instance_id: 0,
                        object_id: id.clone(),
                        update_id,
                        enqueued_uri: item.uri().to_string(),
                        enqueued_uri_metadata: item.metadata(),
                        add_at_index: position,
                    };
                    let response = self.execute::<AddURIToSavedQueueOperation>(&request)?;
                    (
                        AddURIToSavedQueueOperation::ACTION,
                        response.num_tracks_added,
                        response.new_queue_length,
                        response.new_update_id,
                    )
                }
            };

            state.observe(next_update_id, length);
            debug!(object_id = self.object_id(), position, update_id = next_update_id, "Added entry");

            if added != 1 {
                return Err(SonosError::QueueDesync {
                    action,
                    expected: 1,
                    reported: i64::from(added),
                });
            }
        }

        Ok(())
    }

    fn remove_locked(&self, state: &mut QueueState, update_id: u32, positions: &BTreeSet<u32>) -> Result<()> {
        let positions: Vec<u32> = positions.iter().copied().collect();
        let request = ReorderTracksInSavedQueueOperationRequest::remove(self.object_id(), update_id, &positions);
        let response = self.execute::<ReorderTracksInSavedQueueOperation>(&request)?;
        state.observe(response.new_update_id, response.new_queue_length);
        debug!(
            object_id = self.object_id(),
            count = positions.len(),
            update_id = response.new_update_id,
            "Removed entries"
        );

        let expected = -(positions.len() as i64);
        let reported = i64::from(response.queue_length_change);
        if reported != expected {
            return Err(SonosError::QueueDesync {
                action: ReorderTracksInSavedQueueOperation::ACTION,
                expected,
                reported,
            });
        }
        Ok(())
    }

    fn current_update_id(&self, state: &mut QueueState) -> Result<u32> {
        match state.update_id {
            Some(update_id) => Ok(update_id),
            None => Ok(self.browse(state, 0, 1)?.update_id),
        }
    }

    fn sync(&self, state: &mut QueueState) -> Result<()> {
        self.browse(state, 0, 1).map(|_| ())
    }

    fn browse(&self, state: &mut QueueState, start: u32, count: u32) -> Result<BrowseResponse> {
        let request = BrowseOperationRequest::direct_children(self.object_id(), start, count);
        let response = self.execute::<BrowseOperation>(&request)?;
        state.observe(response.update_id, response.total_matches);
        Ok(response)
    }

    pub(crate) fn execute<Op: UPnPOperation>(&self, request: &Op::Request) -> Result<Op::Response> {
        self.controller.execute::<Op>(request)
    }
}
