//! Sans-I/O mDNS resolution session.
//!
//! This module provides [`Session`], the retry/timeout state machine behind a
//! single hostname lookup. It implements the [`sansio::Protocol`] trait and
//! never touches a socket or a clock on its own.
//!
//! # Overview
//!
//! The caller is responsible for:
//!
//! 1. **Network I/O**: sending the packets from `poll_write()` to
//!    224.0.0.251:5353 and passing received datagrams to `handle_read()`
//! 2. **Timing**: delivering ticks, either as [`SessionCommand::Tick`]
//!    events or by calling `handle_timeout()` when `poll_timeout()` expires
//! 3. **Outcome**: reading the single terminal event from `poll_event()`
//!
//! # Lifecycle
//!
//! ```text
//! Idle --start--> QuerySent --reply----> Resolved | ProtocolError
//!                     |  ^
//!                tick |  | resend (retry < max_retries)
//!                     v  |
//!               wait_ticks elapsed --retry == max_retries--> Timeout
//!
//! any non-terminal state --abort/close--> Aborted
//! ```
//!
//! # Example
//!
//! ```rust
//! use mdns_resolver::{ResolverConfig, Session, SessionCommand, SessionEvent, SessionState};
//! use sansio::Protocol;
//! use std::time::Instant;
//!
//! let mut session = Session::new(ResolverConfig::default().with_max_retries(0));
//! session.start("printer.local", Instant::now()).unwrap();
//!
//! // The query is queued for the multicast group.
//! let packet = session.poll_write().expect("query packet should be queued");
//! assert_eq!(packet.transport.peer_addr.to_string(), "224.0.0.251:5353");
//!
//! // Nobody answers within three ticks.
//! for _ in 0..3 {
//!     session.handle_event(SessionCommand::Tick).unwrap();
//! }
//! assert_eq!(*session.state(), SessionState::Timeout);
//! assert!(matches!(session.poll_event(), Some(SessionEvent::Timeout)));
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use bytes::BytesMut;
use shared::{TaggedBytesMut, TransportContext, TransportMessage};

use crate::config::{DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_WAIT_TICKS, ResolverConfig};
use crate::message::header::Header;
use crate::message::{Message, RCode, Reply};
use shared::error::{Error, Result};

/// The mDNS multicast group address (224.0.0.251).
pub const MDNS_MULTICAST_IPV4: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);

/// The standard mDNS port (5353).
pub const MDNS_PORT: u16 = 5353;

/// mDNS multicast destination address (224.0.0.251:5353).
///
/// # Example
///
/// ```rust
/// use mdns_resolver::MDNS_DEST_ADDR;
///
/// assert_eq!(MDNS_DEST_ADDR.to_string(), "224.0.0.251:5353");
/// ```
pub const MDNS_DEST_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(MDNS_MULTICAST_IPV4), MDNS_PORT);

/// Link-layer address of the mDNS group (01:00:5e:00:00:fb).
pub const MDNS_MULTICAST_MAC: [u8; 6] = [0x01, 0x00, 0x5e, 0x00, 0x00, 0xfb];

/// Why a reply could not be turned into an address.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// The reply did not decode.
    Malformed(Error),
    /// The responder reported a non-zero response code.
    ResponseCode(RCode),
    /// The reply decoded cleanly but carried no A record.
    NoAddress,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Malformed(err) => write!(f, "malformed reply: {err}"),
            ProtocolError::ResponseCode(rcode) => write!(f, "reply carried {rcode}"),
            ProtocolError::NoAddress => write!(f, "reply carried no A record"),
        }
    }
}

/// Where a [`Session`] is in its lifecycle.
///
/// `Resolved`, `ProtocolError`, `Timeout` and `Aborted` are terminal.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum SessionState {
    #[default]
    Idle,
    QuerySent,
    Resolved(Ipv4Addr),
    ProtocolError(ProtocolError),
    Timeout,
    Aborted,
}

impl SessionState {
    /// Reports whether no further input can change the state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Resolved(_)
                | SessionState::ProtocolError(_)
                | SessionState::Timeout
                | SessionState::Aborted
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::QuerySent => write!(f, "query sent"),
            SessionState::Resolved(addr) => write!(f, "resolved to {addr}"),
            SessionState::ProtocolError(err) => write!(f, "protocol error: {err}"),
            SessionState::Timeout => write!(f, "timed out"),
            SessionState::Aborted => write!(f, "aborted"),
        }
    }
}

/// Events emitted by a [`Session`].
///
/// Exactly one is emitted, when the session reaches a terminal state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The name resolved to this address.
    Resolved(Ipv4Addr),
    /// A reply arrived but could not be used.
    Failed(ProtocolError),
    /// Every attempt went unanswered.
    Timeout,
    /// The lookup was cancelled.
    Aborted,
}

/// Inputs accepted through [`handle_event()`](sansio::Protocol::handle_event).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// One unit of the timeout clock has passed.
    Tick,
    /// Cancel the lookup.
    Abort,
}

/// Sans-I/O mDNS lookup of one hostname.
///
/// A session sends one A query for its name, re-sends it every `wait_ticks`
/// ticks up to `max_retries` times, and settles on the first reply that is a
/// response. It never binds a socket, reads a clock or sleeps.
///
/// # Sans-I/O Pattern
///
/// 1. Call [`start()`](Session::start) with the hostname
/// 2. Send packets from [`poll_write()`](sansio::Protocol::poll_write)
/// 3. Pass received datagrams to [`handle_read()`](sansio::Protocol::handle_read)
/// 4. Deliver ticks through [`handle_event()`](sansio::Protocol::handle_event) or
///    [`handle_timeout()`](sansio::Protocol::handle_timeout)
/// 5. Collect the outcome from [`poll_event()`](sansio::Protocol::poll_event)
pub struct Session {
    max_retries: u32,
    wait_ticks: u32,
    max_message_size: usize,
    max_name_len: usize,
    tick_interval: Duration,

    /// Hostname being resolved, with trailing dot
    name: Option<String>,

    /// Encoded query, re-sent unchanged on every retry
    query: Vec<u8>,

    state: SessionState,
    retries: u32,
    elapsed_ticks: u32,

    /// Wall-clock time of the last tick counted by `handle_timeout`
    last_tick: Option<Instant>,

    write_outs: VecDeque<TaggedBytesMut>,
    event_outs: VecDeque<SessionEvent>,
}

impl Session {
    /// Create an idle session with the given configuration.
    ///
    /// Zero values for `wait_ticks`, `max_message_size`, `max_name_len` or
    /// `tick_interval` are replaced by their defaults.
    pub fn new(config: ResolverConfig) -> Self {
        let defaults = ResolverConfig::default();
        Self {
            max_retries: config.max_retries,
            wait_ticks: if config.wait_ticks == 0 {
                DEFAULT_WAIT_TICKS
            } else {
                config.wait_ticks
            },
            max_message_size: if config.max_message_size == 0 {
                DEFAULT_MAX_MESSAGE_SIZE
            } else {
                config.max_message_size
            },
            max_name_len: if config.max_name_len == 0 {
                defaults.max_name_len
            } else {
                config.max_name_len
            },
            tick_interval: if config.tick_interval.is_zero() {
                defaults.tick_interval
            } else {
                config.tick_interval
            },
            name: None,
            query: Vec::new(),
            state: SessionState::Idle,
            retries: 0,
            elapsed_ticks: 0,
            last_tick: None,
            write_outs: VecDeque::new(),
            event_outs: VecDeque::new(),
        }
    }

    /// Start resolving `name`.
    ///
    /// Builds the query, queues it for [`MDNS_DEST_ADDR`] and enters
    /// [`SessionState::QuerySent`]. `now` anchors the tick clock used by
    /// [`handle_timeout()`](sansio::Protocol::handle_timeout).
    ///
    /// # Errors
    ///
    /// - [`Error::ErrSessionStarted`] unless the session is idle.
    /// - A wire-format error if `name` cannot be encoded (e.g.
    ///   [`Error::ErrSegTooLong`]); the session stays idle.
    pub fn start(&mut self, name: &str, now: Instant) -> Result<()> {
        if self.state != SessionState::Idle {
            return Err(Error::ErrSessionStarted);
        }

        self.query = Message::build_query(name)?;
        self.name = Some(if name.ends_with('.') {
            name.to_owned()
        } else {
            format!("{name}.")
        });
        self.retries = 0;
        self.elapsed_ticks = 0;
        self.last_tick = Some(now);
        self.state = SessionState::QuerySent;

        log::debug!("Resolving {name} via mDNS");
        self.queue_query(now);
        Ok(())
    }

    /// Cancel the lookup.
    ///
    /// Queued packets are dropped and [`SessionEvent::Aborted`] is emitted.
    /// Does nothing once the session is terminal.
    pub fn abort(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.finish(SessionState::Aborted);
    }

    /// Current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Hostname being resolved, with trailing dot.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of re-sends so far.
    pub fn retry_count(&self) -> u32 {
        self.retries
    }

    /// Ticks counted since the last send.
    pub fn elapsed_ticks(&self) -> u32 {
        self.elapsed_ticks
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// The resolved address, once the session is [`SessionState::Resolved`].
    pub fn address(&self) -> Option<Ipv4Addr> {
        match self.state {
            SessionState::Resolved(addr) => Some(addr),
            _ => None,
        }
    }

    pub(crate) fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    fn queue_query(&mut self, now: Instant) {
        log::trace!(
            "Queuing {} byte mDNS query to {MDNS_DEST_ADDR}",
            self.query.len()
        );
        self.write_outs.push_back(TransportMessage {
            now,
            transport: TransportContext {
                peer_addr: MDNS_DEST_ADDR,
                ..Default::default()
            },
            message: BytesMut::from(&self.query[..]),
        });
    }

    fn on_tick(&mut self, now: Instant) {
        self.elapsed_ticks += 1;
        if self.elapsed_ticks < self.wait_ticks {
            return;
        }
        self.elapsed_ticks = 0;

        if self.retries >= self.max_retries {
            log::debug!(
                "No reply for {} after {} attempts",
                self.name.as_deref().unwrap_or_default(),
                self.retries + 1
            );
            self.finish(SessionState::Timeout);
        } else {
            self.retries += 1;
            log::debug!(
                "Re-sending query for {} (retry {}/{})",
                self.name.as_deref().unwrap_or_default(),
                self.retries,
                self.max_retries
            );
            self.queue_query(now);
        }
    }

    fn process_reply(&mut self, data: &[u8]) {
        let mut header = Header::default();
        if let Err(err) = header.unpack(data, 0) {
            self.fail(ProtocolError::Malformed(err));
            return;
        }
        if !header.response {
            log::debug!("Ignoring mDNS query datagram");
            return;
        }

        match Reply::parse(data, self.max_name_len) {
            Err(err) => self.fail(ProtocolError::Malformed(err)),
            Ok(reply) if reply.header.rcode != RCode::Success => {
                self.fail(ProtocolError::ResponseCode(reply.header.rcode))
            }
            Ok(Reply {
                address: Some(addr),
                ..
            }) => {
                log::debug!(
                    "Resolved {} to {addr}",
                    self.name.as_deref().unwrap_or_default()
                );
                self.finish(SessionState::Resolved(addr));
            }
            Ok(_) => self.fail(ProtocolError::NoAddress),
        }
    }

    fn fail(&mut self, err: ProtocolError) {
        log::warn!(
            "mDNS lookup of {} failed: {err}",
            self.name.as_deref().unwrap_or_default()
        );
        self.finish(SessionState::ProtocolError(err));
    }

    // finish enters a terminal state and emits its event.
    fn finish(&mut self, state: SessionState) {
        let event = match &state {
            SessionState::Resolved(addr) => SessionEvent::Resolved(*addr),
            SessionState::ProtocolError(err) => SessionEvent::Failed(err.clone()),
            SessionState::Timeout => SessionEvent::Timeout,
            _ => SessionEvent::Aborted,
        };
        log::debug!("Session {} -> {}", self.state, state);
        if state == SessionState::Aborted {
            self.write_outs.clear();
        }
        self.state = state;
        self.last_tick = None;
        self.event_outs.push_back(event);
    }
}

impl sansio::Protocol<TaggedBytesMut, (), SessionCommand> for Session {
    type Rout = ();
    type Wout = TaggedBytesMut;
    type Eout = SessionEvent;
    type Error = Error;
    type Time = Instant;

    /// Process a datagram received on the mDNS group.
    ///
    /// Only the first `max_message_size` bytes are looked at. Queries
    /// (QR = 0), including our own looped-back one, are ignored; the first
    /// response settles the session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ErrSessionTerminated`] once the session is terminal;
    /// the datagram is discarded.
    fn handle_read(&mut self, msg: TaggedBytesMut) -> Result<()> {
        match self.state {
            SessionState::QuerySent => {}
            SessionState::Idle => {
                log::debug!("Ignoring datagram from {} before start", msg.transport.peer_addr);
                return Ok(());
            }
            _ => return Err(Error::ErrSessionTerminated),
        }

        let len = msg.message.len().min(self.max_message_size);
        log::trace!(
            "Received {} bytes from {} ({} considered)",
            msg.message.len(),
            msg.transport.peer_addr,
            len
        );
        self.process_reply(&msg.message[..len]);
        Ok(())
    }

    /// A session produces no read outputs; the outcome is an event.
    fn poll_read(&mut self) -> Option<Self::Rout> {
        None
    }

    /// Not used; queries are started with [`Session::start`].
    fn handle_write(&mut self, _msg: ()) -> Result<()> {
        Ok(())
    }

    /// Next packet to send to `packet.transport.peer_addr`.
    fn poll_write(&mut self) -> Option<Self::Wout> {
        self.write_outs.pop_front()
    }

    /// Deliver a [`SessionCommand`].
    ///
    /// `Tick` advances the tick counter by one without consulting a clock,
    /// and returns
    /// [`Error::ErrSessionTerminated`] on a terminal session. `Abort` behaves
    /// like [`Session::abort`].
    fn handle_event(&mut self, evt: SessionCommand) -> Result<()> {
        match evt {
            SessionCommand::Tick => {
                if self.state.is_terminal() {
                    return Err(Error::ErrSessionTerminated);
                }
                // A resend is stamped with the latest time the host supplied.
                let now = match self.state {
                    SessionState::QuerySent => self.last_tick,
                    _ => None,
                };
                if let Some(now) = now {
                    self.on_tick(now);
                }
            }
            SessionCommand::Abort => self.abort(),
        }
        Ok(())
    }

    fn poll_event(&mut self) -> Option<Self::Eout> {
        self.event_outs.pop_front()
    }

    /// Convert the wall-clock time since the last counted tick into ticks.
    ///
    /// Every whole `tick_interval` that has passed counts as one tick, so a
    /// late call catches up on all of them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ErrSessionTerminated`] once the session is terminal.
    fn handle_timeout(&mut self, now: Self::Time) -> Result<()> {
        if self.state.is_terminal() {
            return Err(Error::ErrSessionTerminated);
        }

        while self.state == SessionState::QuerySent {
            let Some(last_tick) = self.last_tick else {
                break;
            };
            let deadline = last_tick + self.tick_interval;
            if deadline > now {
                break;
            }
            self.last_tick = Some(deadline);
            self.on_tick(deadline);
        }
        Ok(())
    }

    /// When the next tick is due, while a query is outstanding.
    fn poll_timeout(&mut self) -> Option<Self::Time> {
        match self.state {
            SessionState::QuerySent => self.last_tick.map(|t| t + self.tick_interval),
            _ => None,
        }
    }

    /// Abort the lookup if it is still running.
    fn close(&mut self) -> Result<()> {
        self.abort();
        Ok(())
    }
}
