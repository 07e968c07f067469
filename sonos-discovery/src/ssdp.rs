//! SSDP (Simple Service Discovery Protocol) client for zone player discovery
//!
//! One M-SEARCH goes out per discovery call and every reply that arrives
//! before the deadline is collected. Socket setup is internal; reply parsing
//! is exposed so callers can inspect what devices answered with.

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::{Duration, Instant};

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, trace};

use crate::config::{DiscoveryConfig, NetworkInterface};
use crate::error::{DiscoveryError, Result};

/// Search target zone players answer to
pub const SEARCH_TARGET: &str = "urn:schemas-upnp-org:device:ZonePlayer:1";

/// Replies are read into a buffer of this size, longer datagrams are truncated
const RECEIVE_BUFFER_SIZE: usize = 2048;

/// One SSDP reply with its header names lower-cased
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReply {
    headers: HashMap<String, String>,
}

impl DiscoveryReply {
    /// Parse a single reply block.
    ///
    /// Each line is split at its first colon. Lines without a colon, or
    /// with the colon in the first position, are ignored. The status line
    /// is skipped this way too.
    pub fn parse(block: &str) -> Self {
        let headers = block
            .lines()
            .filter_map(|line| {
                let pos = line.find(':')?;
                if pos == 0 {
                    return None;
                }
                let key = line[..pos].trim().to_ascii_lowercase();
                let value = line[pos + 1..].trim().to_string();
                Some((key, value))
            })
            .collect();

        Self { headers }
    }

    /// Look up a header by name, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Value of the `st` header
    pub fn search_target(&self) -> Option<&str> {
        self.header("st")
    }

    /// Value of the `usn` header
    pub fn usn(&self) -> Option<&str> {
        self.header("usn")
    }

    /// Value of the `location` header
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Split a datagram into reply blocks at blank lines.
///
/// Blocks carrying no headers at all are dropped.
pub(crate) fn split_replies(datagram: &str) -> Vec<DiscoveryReply> {
    datagram
        .split("\r\n\r\n")
        .map(DiscoveryReply::parse)
        .filter(|reply| !reply.is_empty())
        .collect()
}

/// Build the M-SEARCH request for `SEARCH_TARGET`
pub(crate) fn search_request(multicast_address: Ipv4Addr) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: {}:reservedSSDPport\r\n\
         MAN: ssdp:discover\r\n\
         MX: 1\r\n\
         ST: {}\r\n",
        multicast_address, SEARCH_TARGET
    )
}

/// UDP socket set up for one SSDP probe, closed when dropped
pub(crate) struct SsdpSocket {
    socket: UdpSocket,
}

impl SsdpSocket {
    /// Create a socket with the configured TTL and outgoing interface
    pub fn open(config: &DiscoveryConfig) -> Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to create UDP socket: {}", e)))?;

        socket
            .set_multicast_ttl_v4(config.multicast_ttl)
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to set multicast TTL: {}", e)))?;

        if let Some(interface) = config
            .network_interface
            .as_ref()
            .filter(|interface| !interface.is_default())
        {
            let address = interface_address(interface)?;
            debug!(%interface, %address, "Sending discovery probe through interface");
            socket
                .set_multicast_if_v4(&address)
                .map_err(|e| DiscoveryError::NetworkError(format!("Failed to set multicast interface: {}", e)))?;
        }

        let bind_address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0));
        socket
            .bind(&bind_address.into())
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to bind UDP socket: {}", e)))?;

        Ok(Self {
            socket: socket.into(),
        })
    }

    /// Send the M-SEARCH request to `target`
    pub fn search(&self, target: SocketAddrV4) -> Result<()> {
        let request = search_request(*target.ip());
        trace!(%target, "Sending M-SEARCH");

        self.socket
            .send_to(request.as_bytes(), target)
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to send M-SEARCH: {}", e)))?;

        Ok(())
    }

    /// Read replies until `timeout` has elapsed or the socket goes quiet
    pub fn collect(&self, timeout: Duration) -> Result<Vec<DiscoveryReply>> {
        let deadline = Instant::now() + timeout;
        let mut buffer = [0u8; RECEIVE_BUFFER_SIZE];
        let mut replies = Vec::new();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            self.socket
                .set_read_timeout(Some(remaining))
                .map_err(|e| DiscoveryError::NetworkError(format!("Failed to set read timeout: {}", e)))?;

            match self.socket.recv_from(&mut buffer) {
                Ok((size, from)) => {
                    let text = String::from_utf8_lossy(&buffer[..size]);
                    trace!(%from, size, "Received SSDP datagram");
                    replies.extend(split_replies(&text));
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    break;
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(DiscoveryError::NetworkError(format!("Socket error: {}", e)));
                }
            }
        }

        Ok(replies)
    }
}

/// Resolve an interface to the IPv4 address the socket option expects
fn interface_address(interface: &NetworkInterface) -> Result<Ipv4Addr> {
    let name = match interface {
        NetworkInterface::Name(name) => name.clone(),
        NetworkInterface::Index(index) => interface_name_from_index(*index).ok_or_else(|| {
            DiscoveryError::InvalidInterface(format!("no interface with index {}", index))
        })?,
    };

    let interfaces = local_ip_address::list_afinet_netifas()
        .map_err(|e| DiscoveryError::InvalidInterface(format!("Failed to list interfaces: {}", e)))?;

    interfaces
        .into_iter()
        .find_map(|(iface, ip)| match ip {
            std::net::IpAddr::V4(v4) if iface == name => Some(v4),
            _ => None,
        })
        .ok_or_else(|| DiscoveryError::InvalidInterface(format!("{} has no IPv4 address", name)))
}

#[cfg(unix)]
fn interface_name_from_index(index: u32) -> Option<String> {
    let mut buffer = [0 as libc::c_char; libc::IF_NAMESIZE];
    // SAFETY: the buffer holds IF_NAMESIZE bytes as if_indextoname requires
    let name = unsafe { libc::if_indextoname(index, buffer.as_mut_ptr()) };
    if name.is_null() {
        return None;
    }
    // SAFETY: on success the buffer holds a NUL-terminated name
    let name = unsafe { std::ffi::CStr::from_ptr(buffer.as_ptr()) };
    Some(name.to_string_lossy().into_owned())
}

#[cfg(not(unix))]
fn interface_name_from_index(_index: u32) -> Option<String> {
    None
}
