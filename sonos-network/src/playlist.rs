//! Saved queues

use std::ops::Deref;
use std::sync::OnceLock;

use sonos_api::services::content_directory::{
    BrowseOperation, BrowseOperationRequest, DestroyObjectOperation, DestroyObjectOperationRequest,
};
use tracing::info;

use crate::error::{Result, SonosError};
use crate::queue::{Queue, QueueTarget, SharedQueueState};
use crate::speaker::SpeakerHandle;
use crate::track::parse_didl;

/// A named saved queue
///
/// Dereferences to [`Queue`] for every listing and mutation operation.
#[derive(Debug, Clone)]
pub struct Playlist {
    queue: Queue,
    name: OnceLock<String>,
}

impl Playlist {
    pub(crate) fn with_state(
        controller: SpeakerHandle,
        id: impl Into<String>,
        name: Option<String>,
        state: SharedQueueState,
    ) -> Self {
        Self::from_queue(
            Queue::with_state(controller, QueueTarget::playlist(id), state),
            name,
        )
    }

    fn from_queue(queue: Queue, name: Option<String>) -> Self {
        let cell = OnceLock::new();
        if let Some(name) = name {
            let _ = cell.set(name);
        }
        Self { queue, name: cell }
    }

    /// Object id, e.g. "SQ:3"
    pub fn id(&self) -> &str {
        self.queue.object_id()
    }

    /// Title of the playlist, read from the device on first use
    pub fn name(&self) -> Result<String> {
        if let Some(name) = self.name.get() {
            return Ok(name.clone());
        }

        let request = BrowseOperationRequest::metadata(self.id());
        let response = self.queue.execute::<BrowseOperation>(&request)?;
        let container = parse_didl(&response.result)?
            .containers
            .into_iter()
            .next()
            .ok_or_else(|| SonosError::Parse(format!("No metadata returned for {}", self.id())))?;

        Ok(self.name.get_or_init(|| container.title).clone())
    }

    /// Remove the playlist from the household
    pub fn delete(self) -> Result<()> {
        let request = DestroyObjectOperationRequest {
            object_id: self.id().to_string(),
        };
        self.queue.execute::<DestroyObjectOperation>(&request)?;
        info!(id = self.id(), "Deleted playlist");
        Ok(())
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }
}

impl Deref for Playlist {
    type Target = Queue;

    fn deref(&self) -> &Queue {
        &self.queue
    }
}
