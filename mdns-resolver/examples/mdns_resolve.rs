//! Resolves one `.local` hostname to an IPv4 address.
//!
//! The sans-I/O [`Session`] is driven over a tokio socket joined to the mDNS
//! group: packets from `poll_write()` go out, datagrams come back through
//! `handle_read()`, and `handle_timeout()` is called whenever the deadline
//! from `poll_timeout()` passes.
//!
//! # Usage
//!
//! ```text
//! cargo run --package mdns-resolver --example mdns_resolve -- printer.local
//! cargo run --package mdns-resolver --example mdns_resolve -- nas.local --interface 192.168.1.2 --debug
//! ```

use std::io::Write;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use clap::Parser;
use mdns_resolver::{MulticastSocket, ResolverConfig, Session, SessionEvent};
use sansio::Protocol;
use shared::{TaggedBytesMut, TransportContext};
use tokio::net::UdpSocket;

#[derive(Parser)]
#[command(name = "mDNS Resolve")]
#[command(version = "0.1.0")]
#[command(about = "Resolves a .local hostname with a sans-I/O mDNS session", long_about = None)]
struct Cli {
    /// Hostname to resolve
    name: String,

    /// Join the multicast group on this interface
    #[arg(long)]
    interface: Option<Ipv4Addr>,

    /// Ticks to wait for a reply before resending the query
    #[arg(long, default_value_t = 3)]
    wait_ticks: u32,

    /// Resends before giving up
    #[arg(long, default_value_t = 2)]
    max_retries: u32,

    /// Length of one tick in milliseconds
    #[arg(long, default_value_t = 1000)]
    tick_ms: u64,

    #[arg(short, long)]
    debug: bool,
    #[arg(long, default_value_t = format!("INFO"))]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let log_level = log::LevelFilter::from_str(&cli.log_level)?;
    if cli.debug {
        env_logger::Builder::new()
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{}:{} [{}] {} - {}",
                    record.file().unwrap_or("unknown"),
                    record.line().unwrap_or(0),
                    record.level(),
                    chrono::Local::now().format("%H:%M:%S.%6f"),
                    record.args()
                )
            })
            .filter(None, log_level)
            .init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let config = ResolverConfig::default()
        .with_wait_ticks(cli.wait_ticks)
        .with_max_retries(cli.max_retries)
        .with_tick_interval(Duration::from_millis(cli.tick_ms));
    let max_wait = config.tick_interval * config.wait_ticks * (config.max_retries + 1);

    let mut builder = MulticastSocket::new();
    if let Some(interface) = cli.interface {
        builder = builder.with_interface(interface);
    }
    let socket = UdpSocket::from_std(builder.into_std()?)?;
    let local_addr: SocketAddr = socket.local_addr()?;

    let mut session = Session::new(config);
    session.start(&cli.name, Instant::now())?;
    log::info!("Resolving '{}' (giving up after {:?})", cli.name, max_wait);

    let mut buf = vec![0u8; mdns_resolver::MAX_DATAGRAM_SIZE];

    loop {
        while let Some(packet) = session.poll_write() {
            log::trace!(
                "Sending {} bytes to {}",
                packet.message.len(),
                packet.transport.peer_addr
            );
            socket
                .send_to(&packet.message, packet.transport.peer_addr)
                .await?;
        }

        while let Some(event) = session.poll_event() {
            match event {
                SessionEvent::Resolved(addr) => {
                    println!("{} = {}", cli.name, addr);
                    return Ok(());
                }
                SessionEvent::Failed(err) => {
                    return Err(format!("{}: {}", cli.name, err).into());
                }
                SessionEvent::Timeout => {
                    return Err(format!("{}: no answer after {:?}", cli.name, max_wait).into());
                }
                SessionEvent::Aborted => return Ok(()),
            }
        }

        let Some(deadline) = session.poll_timeout() else {
            break;
        };
        let wait = deadline.saturating_duration_since(Instant::now());

        tokio::select! {
            result = socket.recv_from(&mut buf) => {
                match result {
                    Ok((len, src)) => {
                        log::trace!("Received {} bytes from {}", len, src);
                        let msg = TaggedBytesMut {
                            now: Instant::now(),
                            transport: TransportContext::udp(local_addr, src),
                            message: BytesMut::from(&buf[..len]),
                        };
                        if let Err(err) = session.handle_read(msg) {
                            log::warn!("Failed to handle datagram: {}", err);
                        }
                    }
                    Err(err) => log::warn!("Socket recv error: {}", err),
                }
            }
            _ = tokio::time::sleep(wait) => {
                if let Err(err) = session.handle_timeout(Instant::now()) {
                    log::warn!("Failed to handle timeout: {}", err);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                session.close()?;
            }
        }
    }

    Ok(())
}
