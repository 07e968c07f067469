//! ContentDirectory service operations
//!
//! Listing of the queue and saved queues, and deletion of saved queues.

use crate::operation::{Validate, ValidationError};
use crate::define_operation_with_response;
use paste::paste;

/// Browse the children of a container
pub const BROWSE_DIRECT_CHILDREN: &str = "BrowseDirectChildren";

/// Browse the container itself
pub const BROWSE_METADATA: &str = "BrowseMetadata";

define_operation_with_response! {
    operation: BrowseOperation,
    action: "Browse",
    service: ContentDirectory,
    request: {
        object_id: String => "ObjectID",
        browse_flag: String => "BrowseFlag",
        filter: String => "Filter",
        starting_index: u32 => "StartingIndex",
        requested_count: u32 => "RequestedCount",
        sort_criteria: String => "SortCriteria",
    },
    response: BrowseResponse {
        result: String => "Result",
        number_returned: u32 => "NumberReturned",
        total_matches: u32 => "TotalMatches",
        update_id: u32 => "UpdateID",
    },
}

impl BrowseOperationRequest {
    /// List `count` children of `object_id` starting at `start`
    pub fn direct_children(object_id: impl Into<String>, start: u32, count: u32) -> Self {
        Self {
            object_id: object_id.into(),
            browse_flag: BROWSE_DIRECT_CHILDREN.to_string(),
            filter: String::new(),
            starting_index: start,
            requested_count: count,
            sort_criteria: String::new(),
        }
    }

    /// Describe `object_id` itself
    pub fn metadata(object_id: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            browse_flag: BROWSE_METADATA.to_string(),
            filter: String::new(),
            starting_index: 0,
            requested_count: 1,
            sort_criteria: String::new(),
        }
    }
}

impl Validate for BrowseOperationRequest {
    fn validate_boundary(&self) -> Result<(), ValidationError> {
        if self.object_id.is_empty() {
            return Err(ValidationError::missing("ObjectID"));
        }
        match self.browse_flag.as_str() {
            BROWSE_DIRECT_CHILDREN | BROWSE_METADATA => Ok(()),
            other => Err(ValidationError::invalid_value(
                "BrowseFlag",
                other,
                "must be BrowseDirectChildren or BrowseMetadata",
            )),
        }
    }
}

define_operation_with_response! {
    operation: DestroyObjectOperation,
    action: "DestroyObject",
    service: ContentDirectory,
    request: {
        object_id: String => "ObjectID",
    },
    response: DestroyObjectResponse {},
}

impl Validate for DestroyObjectOperationRequest {
    fn validate_boundary(&self) -> Result<(), ValidationError> {
        if self.object_id.is_empty() {
            return Err(ValidationError::missing("ObjectID"));
        }
        Ok(())
    }
}
