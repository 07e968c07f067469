//! Error types for the discovery system.

use std::fmt;

/// Error type for discovery operations.
///
/// Socket failures are fatal to a discovery call and are never retried here;
/// finding no devices is not an error at this layer.
#[derive(Debug)]
pub enum DiscoveryError {
    /// Socket creation, option or send failure
    NetworkError(String),
    /// Parsing errors (device description XML, cached address list)
    ParseError(String),
    /// The requested network interface does not exist or has no IPv4 address
    InvalidInterface(String),
    /// The backing cache store could not be read or written
    CacheError(String),
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DiscoveryError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DiscoveryError::InvalidInterface(msg) => write!(f, "Invalid network interface: {}", msg),
            DiscoveryError::CacheError(msg) => write!(f, "Cache error: {}", msg),
        }
    }
}

impl std::error::Error for DiscoveryError {}

/// Convenience Result type alias for discovery operations.
///
/// Equivalent to `std::result::Result<T, DiscoveryError>`.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
