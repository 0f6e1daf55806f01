use std::net::SocketAddr;

use shared::error::Result;

/// Datagram transport used by a [`Resolver`](crate::Resolver).
///
/// Every call must return immediately. Implementations report an I/O
/// failure as [`Error::Io`](shared::error::Error::Io) and a call on a
/// transport that is not open as
/// [`Error::ErrConnectionClosed`](shared::error::Error::ErrConnectionClosed).
pub trait Transport {
    /// Prepare to exchange datagrams with `dest`, whose link-layer address
    /// is `dest_mac`.
    fn open(&mut self, dest: SocketAddr, dest_mac: [u8; 6]) -> Result<()>;

    /// Send one datagram, returning how many bytes went out.
    fn send_to(&mut self, buf: &[u8], dest: SocketAddr) -> Result<usize>;

    /// Size of the next pending datagram, 0 when nothing has arrived.
    fn poll_recv_ready(&mut self) -> Result<usize>;

    /// Receive the pending datagram into `buf`, truncating it to `buf.len()`.
    fn recv_from(&mut self, buf: &mut [u8]) -> Result<(usize, SocketAddr)>;

    /// Release the transport. Closing twice is harmless.
    fn close(&mut self);

    fn is_open(&self) -> bool;
}
