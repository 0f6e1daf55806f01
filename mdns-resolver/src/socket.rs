//! Socket utilities for mDNS.
//!
//! This module provides [`MulticastSocket`], a builder for UDP sockets joined
//! to an IPv4 multicast group, and [`UdpTransport`], the [`Transport`] a
//! [`Resolver`](crate::Resolver) uses to talk to the mDNS group.
//!
//! # Example
//!
//! ```rust,ignore
//! use mdns_resolver::MulticastSocket;
//!
//! let std_socket = MulticastSocket::new().into_std()?;
//!
//! // For tokio:
//! let socket = tokio::net::UdpSocket::from_std(std_socket)?;
//! ```

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use shared::error::{Error, Result};
use socket2::{Domain, Protocol, Socket, Type};

use crate::proto::{MDNS_MULTICAST_IPV4, MDNS_PORT};
use crate::transport::Transport;

/// Largest datagram an mDNS responder may send (RFC 6762 section 17).
pub const MAX_DATAGRAM_SIZE: usize = 9000;

/// Hardware address an IPv4 multicast group maps to (RFC 1112 section 6.4).
///
/// The low 23 bits of the group address are placed into `01:00:5e:00:00:00`.
///
/// ```rust
/// use mdns_resolver::{MDNS_MULTICAST_IPV4, MDNS_MULTICAST_MAC, multicast_mac};
///
/// assert_eq!(multicast_mac(MDNS_MULTICAST_IPV4), MDNS_MULTICAST_MAC);
/// ```
pub fn multicast_mac(group: Ipv4Addr) -> [u8; 6] {
    let o = group.octets();
    [0x01, 0x00, 0x5e, o[1] & 0x7f, o[2], o[3]]
}

/// A builder for creating multicast UDP sockets suitable for mDNS.
///
/// The resulting socket will be:
///
/// - Bound to the configured local address (by default `0.0.0.0:5353`, so
///   both multicast and unicast replies are received)
/// - Configured with `SO_REUSEADDR` enabled
/// - Configured with `SO_REUSEPORT` enabled (on supported platforms)
/// - Set to non-blocking mode
/// - Joined to the multicast group (224.0.0.251 unless changed)
///
/// With a specific network interface:
///
/// ```rust,ignore
/// use mdns_resolver::MulticastSocket;
/// use std::net::Ipv4Addr;
///
/// let std_socket = MulticastSocket::new()
///     .with_interface(Ipv4Addr::new(192, 168, 1, 100))
///     .into_std()?;
/// ```
#[derive(Debug, Clone)]
pub struct MulticastSocket {
    group: Ipv4Addr,
    local_ipv4: Option<Ipv4Addr>,
    local_port: Option<u16>,
    interface: Option<Ipv4Addr>,
}

impl Default for MulticastSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl MulticastSocket {
    /// Creates a builder for the mDNS group on port 5353.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mdns_resolver::MulticastSocket;
    ///
    /// let builder = MulticastSocket::new();
    /// ```
    pub fn new() -> Self {
        Self {
            group: MDNS_MULTICAST_IPV4,
            local_ipv4: None,
            local_port: None,
            interface: None,
        }
    }

    /// Sets the multicast group to join.
    pub fn with_group(mut self, group: Ipv4Addr) -> Self {
        self.group = group;
        self
    }

    pub fn with_local_ipv4(mut self, local_ipv4: Ipv4Addr) -> Self {
        self.local_ipv4 = Some(local_ipv4);
        self
    }

    pub fn with_local_port(mut self, local_port: u16) -> Self {
        self.local_port = Some(local_port);
        self
    }

    /// Sets a specific network interface for multicast operations.
    ///
    /// If not set, the socket joins the multicast group on the default
    /// interface (`INADDR_ANY`).
    ///
    /// # Example
    ///
    /// ```rust
    /// use mdns_resolver::MulticastSocket;
    /// use std::net::Ipv4Addr;
    ///
    /// let builder = MulticastSocket::new()
    ///     .with_interface(Ipv4Addr::new(192, 168, 1, 100));
    /// ```
    pub fn with_interface(mut self, interface: Ipv4Addr) -> Self {
        self.interface = Some(interface);
        self
    }

    // local_addr is where the socket binds. The query asks for unicast
    // replies, which arrive on the host's own address, so the default is
    // the wildcard rather than the group.
    fn local_addr(&self) -> SocketAddr {
        let ip = self.local_ipv4.unwrap_or(Ipv4Addr::UNSPECIFIED);
        SocketAddr::new(IpAddr::V4(ip), self.local_port.unwrap_or(MDNS_PORT))
    }

    /// Converts this builder into a configured `std::net::UdpSocket`.
    ///
    /// # Errors
    ///
    /// Returns an error if creating the socket, setting an option, binding
    /// or joining the group fails.
    ///
    /// # Platform Notes
    ///
    /// On Unix-like systems (except Solaris/illumos), `SO_REUSEPORT` is
    /// enabled so other mDNS stacks on the host can share port 5353.
    pub fn into_std(self) -> io::Result<UdpSocket> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;

        socket.set_reuse_address(true)?;

        #[cfg(all(unix, not(target_os = "solaris"), not(target_os = "illumos")))]
        socket.set_reuse_port(true)?;

        socket.set_nonblocking(true)?;

        let local_addr = self.local_addr();
        socket.bind(&local_addr.into())?;

        let iface = self.interface.unwrap_or(Ipv4Addr::UNSPECIFIED);
        socket.join_multicast_v4(&self.group, &iface)?;
        log::debug!("Bound {local_addr} and joined {} on {iface}", self.group);

        Ok(socket.into())
    }
}

/// [`Transport`] over a non-blocking multicast UDP socket.
///
/// The socket is created by [`open`](Transport::open) from the configured
/// [`MulticastSocket`] builder, joined to the destination group, and dropped
/// by [`close`](Transport::close). Readiness is checked with a non-blocking
/// receive; the datagram it returns is held until
/// [`recv_from`](Transport::recv_from) collects it.
#[derive(Debug, Default)]
pub struct UdpTransport {
    builder: MulticastSocket,
    socket: Option<UdpSocket>,
    pending: Option<(Vec<u8>, SocketAddr)>,
}

impl UdpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `builder` for the sockets this transport opens.
    pub fn with_socket(mut self, builder: MulticastSocket) -> Self {
        self.builder = builder;
        self
    }

    fn socket(&self) -> Result<&UdpSocket> {
        self.socket.as_ref().ok_or(Error::ErrConnectionClosed)
    }
}

impl Transport for UdpTransport {
    fn open(&mut self, dest: SocketAddr, dest_mac: [u8; 6]) -> Result<()> {
        let group = match dest.ip() {
            IpAddr::V4(ip) if ip.is_multicast() => ip,
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{dest} is not an IPv4 multicast address"),
                )
                .into());
            }
        };
        if multicast_mac(group) != dest_mac {
            log::warn!("Hardware address {dest_mac:02x?} does not match group {group}");
        }

        let socket = self.builder.clone().with_group(group).into_std()?;
        self.socket = Some(socket);
        self.pending = None;
        Ok(())
    }

    fn send_to(&mut self, buf: &[u8], dest: SocketAddr) -> Result<usize> {
        Ok(self.socket()?.send_to(buf, dest)?)
    }

    fn poll_recv_ready(&mut self) -> Result<usize> {
        if let Some((data, _)) = &self.pending {
            return Ok(data.len());
        }

        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let received = self.socket()?.recv_from(&mut buf);
        match received {
            Ok((n, src)) => {
                buf.truncate(n);
                self.pending = Some((buf, src));
                Ok(n)
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(err) => Err(err.into()),
        }
    }

    fn recv_from(&mut self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        let (data, src) = match self.pending.take() {
            Some(pending) => pending,
            None => {
                let mut data = vec![0u8; MAX_DATAGRAM_SIZE];
                let (n, src) = self.socket()?.recv_from(&mut data)?;
                data.truncate(n);
                (data, src)
            }
        };
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        Ok((n, src))
    }

    fn close(&mut self) {
        self.socket = None;
        self.pending = None;
    }

    fn is_open(&self) -> bool {
        self.socket.is_some()
    }
}
