use bytes::BytesMut;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Instant;

const UNSPECIFIED_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0);

/// Type of transport protocol. mDNS only runs over UDP.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransportProtocol {
    #[default]
    UDP,
}

/// Transport Context with local address, peer address and protocol
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransportContext {
    /// Local socket address, either IPv4 or IPv6
    pub local_addr: SocketAddr,
    /// Peer socket address, either IPv4 or IPv6
    pub peer_addr: SocketAddr,
    /// Type of transport protocol
    pub transport_protocol: TransportProtocol,
}

impl Default for TransportContext {
    fn default() -> Self {
        Self {
            local_addr: UNSPECIFIED_ADDR,
            peer_addr: UNSPECIFIED_ADDR,
            transport_protocol: TransportProtocol::UDP,
        }
    }
}

impl TransportContext {
    /// UDP context for a datagram exchanged between `local_addr` and `peer_addr`.
    pub fn udp(local_addr: SocketAddr, peer_addr: SocketAddr) -> Self {
        Self {
            local_addr,
            peer_addr,
            transport_protocol: TransportProtocol::UDP,
        }
    }
}

/// A generic transmit with [TransportContext]
pub struct TransportMessage<T> {
    /// Received/Sent time
    pub now: Instant,
    /// A transport context with [local_addr](TransportContext::local_addr) and [peer_addr](TransportContext::peer_addr)
    pub transport: TransportContext,
    /// Message body with generic type
    pub message: T,
}

/// BytesMut type transmit with [TransportContext]
pub type TaggedBytesMut = TransportMessage<BytesMut>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context_is_unspecified_udp() {
        let ctx = TransportContext::default();
        assert_eq!(ctx.local_addr.to_string(), "0.0.0.0:0");
        assert_eq!(ctx.peer_addr.to_string(), "0.0.0.0:0");
        assert_eq!(ctx.transport_protocol, TransportProtocol::UDP);
    }

    #[test]
    fn test_udp_context() {
        let local: SocketAddr = "192.168.1.2:5353".parse().unwrap();
        let peer: SocketAddr = "224.0.0.251:5353".parse().unwrap();
        let ctx = TransportContext::udp(local, peer);
        assert_eq!(ctx.local_addr, local);
        assert_eq!(ctx.peer_addr, peer);
        assert_eq!(ctx.transport_protocol, TransportProtocol::UDP);
    }
}
