//! AVTransport service operations
//!
//! Mutation of the playback queue and of saved queues. Every mutating action
//! takes the container's current UpdateID and answers with the new one.

use crate::operation::{Validate, ValidationError};
use crate::define_operation_with_response;
use paste::paste;

/// Object id of a zone player's playback queue
pub const QUEUE_OBJECT_ID: &str = "Q:0";

// =============================================================================
// PLAYBACK QUEUE
// =============================================================================

define_operation_with_response! {
    operation: AddMultipleURIsToQueueOperation,
    action: "AddMultipleURIsToQueue",
    service: AVTransport,
    request: {
        instance_id: u32 => "InstanceID",
        update_id: u32 => "UpdateID",
        number_of_uris: u32 => "NumberOfURIs",
        enqueued_uris: String => "EnqueuedURIs",
        enqueued_uris_metadata: String => "EnqueuedURIsMetaData",
        container_uri: String => "ContainerURI",
        container_metadata: String => "ContainerMetaData",
        desired_first_track_number_enqueued: u32 => "DesiredFirstTrackNumberEnqueued",
        enqueue_as_next: bool => "EnqueueAsNext",
    },
    response: AddMultipleURIsToQueueResponse {
        first_track_number_enqueued: u32 => "FirstTrackNumberEnqueued",
        num_tracks_added: u32 => "NumTracksAdded",
        new_queue_length: u32 => "NewQueueLength",
        new_update_id: u32 => "NewUpdateID",
    },
}

impl AddMultipleURIsToQueueOperationRequest {
    /// Enqueue a single item so it lands at zero-based `position`
    pub fn single(update_id: u32, uri: impl Into<String>, metadata: impl Into<String>, position: u32) -> Self {
        Self {
            instance_id: 0,
            update_id,
            number_of_uris: 1,
            enqueued_uris: uri.into(),
            enqueued_uris_metadata: metadata.into(),
            container_uri: String::new(),
            container_metadata: String::new(),
            desired_first_track_number_enqueued: position + 1,
            enqueue_as_next: false,
        }
    }
}

impl Validate for AddMultipleURIsToQueueOperationRequest {
    fn validate_boundary(&self) -> Result<(), ValidationError> {
        if self.enqueued_uris.is_empty() {
            return Err(ValidationError::missing("EnqueuedURIs"));
        }
        if self.number_of_uris == 0 {
            return Err(ValidationError::range_error("NumberOfURIs", 1, u32::MAX, 0));
        }
        // a single URI may itself contain spaces; only batches are space separated
        if self.number_of_uris == 1 {
            return Ok(());
        }
        let uris = self.enqueued_uris.split(' ').count() as u32;
        if uris != self.number_of_uris {
            return Err(ValidationError::Custom {
                parameter: "NumberOfURIs".to_string(),
                message: format!("{} given for {} URIs", self.number_of_uris, uris),
            });
        }
        Ok(())
    }
}

// =============================================================================
// SAVED QUEUES
// =============================================================================

define_operation_with_response! {
    operation: AddURIToSavedQueueOperation,
    action: "AddURIToSavedQueue",
    service: AVTransport,
    request: {
        instance_id: u32 => "InstanceID",
        object_id: String => "ObjectID",
        update_id: u32 => "UpdateID",
        enqueued_uri: String => "EnqueuedURI",
        enqueued_uri_metadata: String => "EnqueuedURIMetaData",
        add_at_index: u32 => "AddAtIndex",
    },
    response: AddURIToSavedQueueResponse {
        num_tracks_added: u32 => "NumTracksAdded",
        new_queue_length: u32 => "NewQueueLength",
        new_update_id: u32 => "NewUpdateID",
    },
}

impl Validate for AddURIToSavedQueueOperationRequest {
    fn validate_boundary(&self) -> Result<(), ValidationError> {
        if self.object_id.is_empty() {
            return Err(ValidationError::missing("ObjectID"));
        }
        if self.enqueued_uri.is_empty() {
            return Err(ValidationError::missing("EnqueuedURI"));
        }
        Ok(())
    }
}

define_operation_with_response! {
    operation: ReorderTracksInSavedQueueOperation,
    action: "ReorderTracksInSavedQueue",
    service: AVTransport,
    request: {
        instance_id: u32 => "InstanceID",
        object_id: String => "ObjectID",
        update_id: u32 => "UpdateID",
        track_list: String => "TrackList",
        new_position_list: String => "NewPositionList",
    },
    response: ReorderTracksInSavedQueueResponse {
        queue_length_change: i32 => "QueueLengthChange",
        new_queue_length: u32 => "NewQueueLength",
        new_update_id: u32 => "NewUpdateID",
    },
}

impl ReorderTracksInSavedQueueOperationRequest {
    /// Delete the entries at the given zero-based positions
    pub fn remove(object_id: impl Into<String>, update_id: u32, positions: &[u32]) -> Self {
        Self {
            instance_id: 0,
            object_id: object_id.into(),
            update_id,
            track_list: join_positions(positions),
            new_position_list: String::new(),
        }
    }

    /// Move the entry at `from` to `to`
    pub fn move_track(object_id: impl Into<String>, update_id: u32, from: u32, to: u32) -> Self {
        Self {
            instance_id: 0,
            object_id: object_id.into(),
            update_id,
            track_list: from.to_string(),
            new_position_list: to.to_string(),
        }
    }
}

impl Validate for ReorderTracksInSavedQueueOperationRequest {
    fn validate_boundary(&self) -> Result<(), ValidationError> {
        if self.object_id.is_empty() {
            return Err(ValidationError::missing("ObjectID"));
        }
        if self.track_list.is_empty() {
            return Err(ValidationError::missing("TrackList"));
        }
        Ok(())
    }

    fn validate_comprehensive(&self) -> Result<(), ValidationError> {
        self.validate_boundary()?;

        let tracks = self.track_list.split(',').count();
        if !self.new_position_list.is_empty()
            && self.new_position_list.split(',').count() != tracks
        {
            return Err(ValidationError::Custom {
                parameter: "NewPositionList".to_string(),
                message: "must be empty or list one position per track".to_string(),
            });
        }
        Ok(())
    }
}

define_operation_with_response! {
    operation: CreateSavedQueueOperation,
    action: "CreateSavedQueue",
    service: AVTransport,
    request: {
        instance_id: u32 => "InstanceID",
        title: String => "Title",
        enqueued_uri: String => "EnqueuedURI",
        enqueued_uri_metadata: String => "EnqueuedURIMetaData",
    },
    response: CreateSavedQueueResponse {
        num_tracks_added: u32 => "NumTracksAdded",
        new_queue_length: u32 => "NewQueueLength",
        assigned_object_id: String => "AssignedObjectID",
        new_update_id: u32 => "NewUpdateID",
    },
}

impl Validate for CreateSavedQueueOperationRequest {
    fn validate_boundary(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::missing("Title"));
        }
        Ok(())
    }
}

/// Comma-separated position list as the reorder action expects it
fn join_positions(positions: &[u32]) -> String {
    positions
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
