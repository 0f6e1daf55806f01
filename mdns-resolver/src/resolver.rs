//! Step-function driver tying a [`Session`] to a [`Transport`].

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Instant;

use bytes::BytesMut;
use sansio::Protocol;
use shared::error::{Error, Result};
use shared::{TaggedBytesMut, TransportContext};

use crate::config::ResolverConfig;
use crate::proto::{
    MDNS_DEST_ADDR, MDNS_MULTICAST_MAC, MDNS_PORT, Session, SessionCommand, SessionEvent,
    SessionState,
};
use crate::transport::Transport;

/// Resolves one hostname over a [`Transport`].
///
/// The resolver owns the session, the transport handle and the receive
/// buffer. None of its methods block: the host calls [`poll`](Resolver::poll)
/// whenever it likes and [`tick`](Resolver::tick) once per tick. The transport
/// is closed as soon as the session reaches a terminal state.
///
/// # Example
///
/// ```rust,no_run
/// use mdns_resolver::{Resolver, ResolverConfig, SessionState, UdpTransport};
/// use std::time::{Duration, Instant};
///
/// let mut resolver = Resolver::new(ResolverConfig::default(), UdpTransport::new());
/// resolver.start("printer.local")?;
///
/// let mut next_tick = Instant::now() + Duration::from_secs(1);
/// loop {
///     let state = resolver.poll()?;
///     if state.is_terminal() {
///         println!("{state}");
///         break;
///     }
///     if Instant::now() >= next_tick {
///         resolver.tick()?;
///         next_tick += Duration::from_secs(1);
///     }
///     std::thread::sleep(Duration::from_millis(10));
/// }
/// # Ok::<(), shared::error::Error>(())
/// ```
pub struct Resolver<T: Transport> {
    session: Session,
    transport: T,
    buf: Vec<u8>,
    local_addr: SocketAddr,
}

impl<T: Transport> Resolver<T> {
    pub fn new(config: ResolverConfig, transport: T) -> Self {
        let session = Session::new(config);
        let buf = vec![0u8; session.max_message_size()];
        Self {
            session,
            transport,
            buf,
            local_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), MDNS_PORT),
        }
    }

    /// Open the transport and send the first query for `name`.
    ///
    /// # Errors
    ///
    /// - [`Error::ErrSessionStarted`] if a lookup was already started.
    /// - Any error from [`Transport::open`]; the session stays idle.
    /// - A wire-format error if `name` cannot be encoded; the transport is
    ///   closed again.
    /// - A send failure, which aborts the lookup.
    pub fn start(&mut self, name: &str) -> Result<()> {
        if *self.session.state() != SessionState::Idle {
            return Err(Error::ErrSessionStarted);
        }

        if let Err(err) = self.transport.open(MDNS_DEST_ADDR, MDNS_MULTICAST_MAC) {
            log::warn!("Failed to open mDNS transport: {err}");
            return Err(err);
        }
        if let Err(err) = self.session.start(name, Instant::now()) {
            self.transport.close();
            return Err(err);
        }
        self.flush()
    }

    /// Move at most one received datagram into the session and send whatever
    /// it queued.
    ///
    /// Returns the session state afterwards. Once the state is terminal this
    /// does nothing.
    pub fn poll(&mut self) -> Result<SessionState> {
        if *self.session.state() != SessionState::QuerySent {
            return Ok(self.session.state().clone());
        }

        if self.transport.poll_recv_ready()? > 0 {
            let (n, src) = self.transport.recv_from(&mut self.buf)?;
            self.session.handle_read(TaggedBytesMut {
                now: Instant::now(),
                transport: TransportContext::udp(self.local_addr, src),
                message: BytesMut::from(&self.buf[..n]),
            })?;
        }

        self.flush()?;
        self.release_if_terminal();
        Ok(self.session.state().clone())
    }

    /// Deliver one tick, re-sending or timing out as due.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ErrSessionTerminated`] once the lookup has finished.
    pub fn tick(&mut self) -> Result<SessionState> {
        self.session.handle_event(SessionCommand::Tick)?;
        self.flush()?;
        self.release_if_terminal();
        Ok(self.session.state().clone())
    }

    /// Cancel the lookup and close the transport.
    pub fn abort(&mut self) {
        self.session.abort();
        self.transport.close();
    }

    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    /// The terminal event, once the lookup has finished.
    pub fn poll_event(&mut self) -> Option<SessionEvent> {
        self.session.poll_event()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // flush sends every queued packet. A failed or short send ends the
    // lookup immediately.
    fn flush(&mut self) -> Result<()> {
        while let Some(packet) = self.session.poll_write() {
            let expected = packet.message.len();
            let err = match self
                .transport
                .send_to(&packet.message, packet.transport.peer_addr)
            {
                Ok(n) if n == expected => {
                    log::trace!("Sent {n} bytes to {}", packet.transport.peer_addr);
                    continue;
                }
                Ok(actual) => Error::ErrShortWrite { expected, actual },
                Err(err) => err,
            };

            log::error!("Failed to send mDNS query: {err}");
            self.abort();
            return Err(err);
        }
        Ok(())
    }

    fn release_if_terminal(&mut self) {
        if self.session.is_terminal() && self.transport.is_open() {
            log::debug!("Lookup finished ({}), closing transport", self.session.state());
            self.transport.close();
        }
    }
}
