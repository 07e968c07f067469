//! Typed UPnP operations for zone player queues
//!
//! This crate provides a type-safe, trait-based API for the queue and saved
//! queue actions of a zone player. It uses the private `soap-client` crate
//! for the SOAP communication, behind the [`Transport`] trait.
//!
//! ```rust,no_run
//! use sonos_api::SonosClient;
//! use sonos_api::services::av_transport::{
//!     ReorderTracksInSavedQueueOperation, ReorderTracksInSavedQueueOperationRequest, QUEUE_OBJECT_ID,
//! };
//!
//! let client = SonosClient::new();
//! let request = ReorderTracksInSavedQueueOperationRequest::remove(QUEUE_OBJECT_ID, 17, &[0, 1]);
//! let response = client.execute::<ReorderTracksInSavedQueueOperation>("192.168.1.100", &request)?;
//! assert_eq!(response.queue_length_change, -2);
//! # Ok::<(), sonos_api::ApiError>(())
//! ```

pub mod client;
pub mod error;
pub mod operation;
pub mod service;
pub mod services;

pub use client::{SonosClient, Transport};
pub use error::{ApiError, Result};
pub use operation::{UPnPOperation, Validate, ValidationError, ValidationLevel};
pub use service::{Service, ServiceInfo};
pub use soap_client::{SoapClient, DEFAULT_DEVICE_PORT};
