//! Service modules with typed UPnP operations
//!
//! Each service module declares its operations with
//! [`define_operation_with_response!`](crate::define_operation_with_response).

pub mod av_transport;
pub mod content_directory;

pub use av_transport::*;
pub use content_directory::*;
