//! # mdns-resolver
//!
//! A sans-I/O mDNS (Multicast DNS) resolver for IPv4 hostnames.
//!
//! The crate asks the link-local multicast group `224.0.0.251:5353` for the
//! A record of a `.local` name and reports either the address, the response
//! code of a negative reply, a malformed reply, a timeout or an abort.
//!
//! ## Layers
//!
//! - [`message`]: DNS wire format. Names with compression pointers, the
//!   12-byte header, questions and resource records.
//! - [`Session`]: the retry/timeout state machine for one lookup. It
//!   implements [`sansio::Protocol`] and never performs I/O.
//! - [`Resolver`]: drives a [`Session`] over a [`Transport`] and releases the
//!   transport once the lookup is settled.
//! - [`UdpTransport`] and [`MulticastSocket`]: a non-blocking UDP socket
//!   joined to the mDNS group.
//!
//! ## Sans-I/O Design
//!
//! [`Session`] follows the [sans-I/O](https://sans-io.readthedocs.io/)
//! pattern. The caller is responsible for:
//!
//! 1. Sending the packets returned by `poll_write()`
//! 2. Passing received datagrams to `handle_read()`
//! 3. Delivering ticks, as [`SessionCommand::Tick`] events or through
//!    `handle_timeout()` when `poll_timeout()` expires
//! 4. Reading the terminal event from `poll_event()`
//!
//! ## Quick Start
//!
//! ```rust
//! use bytes::BytesMut;
//! use mdns_resolver::{ResolverConfig, Session, SessionEvent, SessionState};
//! use mdns_resolver::message::{
//!     AResource, DNSCLASS_INET, DnsType, Header, Message, Name, Resource, ResourceHeader,
//! };
//! use sansio::Protocol;
//! use shared::{TaggedBytesMut, TransportContext};
//! use std::net::Ipv4Addr;
//! use std::time::Instant;
//!
//! let mut session = Session::new(ResolverConfig::default());
//! session.start("printer.local", Instant::now()).unwrap();
//! let query = session.poll_write().expect("query should be queued");
//!
//! // A responder on the link answers with its address.
//! let mut reply = Message {
//!     header: Header { response: true, authoritative: true, ..Default::default() },
//!     answers: vec![Resource {
//!         header: ResourceHeader {
//!             name: Name::new("printer.local").unwrap(),
//!             typ: DnsType::A,
//!             class: DNSCLASS_INET,
//!             ttl: 120,
//!             ..Default::default()
//!         },
//!         body: Some(Box::new(AResource { a: [192, 168, 1, 20] })),
//!     }],
//!     ..Default::default()
//! };
//!
//! session
//!     .handle_read(TaggedBytesMut {
//!         now: Instant::now(),
//!         transport: TransportContext::udp(
//!             query.transport.local_addr,
//!             "192.168.1.20:5353".parse().unwrap(),
//!         ),
//!         message: BytesMut::from(&reply.pack().unwrap()[..]),
//!     })
//!     .unwrap();
//!
//! let addr = Ipv4Addr::new(192, 168, 1, 20);
//! assert_eq!(*session.state(), SessionState::Resolved(addr));
//! assert_eq!(session.poll_event(), Some(SessionEvent::Resolved(addr)));
//! ```
//!
//! ## Protocol Details
//!
//! - **Multicast Address**: 224.0.0.251:5353 (IPv4), MAC 01:00:5e:00:00:fb
//! - **Question**: one A question of class IN with the unicast-response bit
//! - **Replies**: the first response settles the lookup with the first A
//!   record of its answer section; every section is still checked
//! - **Compression**: DNS name compression is followed when parsing and used
//!   when packing

#![warn(rust_2018_idioms)]

pub(crate) mod config;
pub mod message;
pub(crate) mod proto;
pub(crate) mod resolver;
pub(crate) mod socket;
pub(crate) mod transport;

pub use config::{
    DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_MAX_NAME_LEN, DEFAULT_MAX_RETRIES, DEFAULT_TICK_INTERVAL,
    DEFAULT_WAIT_TICKS, MAX_DOMAIN_NAME, ResolverConfig,
};
pub use proto::{
    MDNS_DEST_ADDR, MDNS_MULTICAST_IPV4, MDNS_MULTICAST_MAC, MDNS_PORT, ProtocolError, Session,
    SessionCommand, SessionEvent, SessionState,
};
pub use resolver::Resolver;
pub use socket::{MAX_DATAGRAM_SIZE, MulticastSocket, UdpTransport, multicast_mac};
pub use transport::Transport;
