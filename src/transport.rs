//! One challenge out, one datagram back.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::QueryConfig;
use crate::error::Error;

/// A raw reply and the wall-clock time between sending the request and receiving it.
#[derive(Debug, Clone)]
pub struct Reply {
    pub bytes: Vec<u8>,
    pub elapsed: Duration,
}

impl Reply {
    /// Round-trip time in whole milliseconds.
    pub fn elapsed_millis(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

/// The UDP request/response primitive both clients are built on.
///
/// Each call binds its own socket, sends exactly one datagram and waits for at most one. There are no retries: the
/// protocol has no sequence numbers, so a late reply to an earlier attempt could not be told apart from the answer to
/// a new one.
#[derive(Debug, Clone, Copy)]
pub struct UdpTransport {
    timeout: Duration,
    recv_buffer: usize,
}

impl Default for UdpTransport {
    fn default() -> Self {
        UdpTransport::new(&QueryConfig::default())
    }
}

impl UdpTransport {
    pub fn new(config: &QueryConfig) -> Self {
        UdpTransport {
            timeout: config.timeout,
            recv_buffer: config.recv_buffer.max(1),
        }
    }

    /// Receive timeout applied to every query.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends `payload` to `host:port` and blocks for the reply.
    ///
    /// The socket is dropped before returning, whatever the outcome.
    pub fn query(&self, host: &str, port: u16, payload: &[u8]) -> Result<Reply, Error> {
        let addr = resolve(host, port)?;

        let local: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let sock = UdpSocket::bind(local)?;
        // Connecting makes the OS drop datagrams from anyone but the peer we asked.
        sock.connect(addr)?;
        sock.set_read_timeout(Some(self.timeout))?;

        let mut buf = vec![0; self.recv_buffer];
        let start = Instant::now();
        sock.send(payload)?;
        debug!(peer = %addr, len = payload.len(), "sent challenge");

        let len = match sock.recv(&mut buf) {
            Ok(len) => len,
            Err(e) if [io::ErrorKind::WouldBlock, io::ErrorKind::TimedOut].contains(&e.kind()) => {
                debug!(peer = %addr, timeout_ms = self.timeout.as_millis() as u64, "timed out");
                return Err(Error::Timeout(self.timeout));
            }
            Err(e) => return Err(e.into()),
        };
        let elapsed = start.elapsed();
        buf.truncate(len);
        debug!(peer = %addr, len, elapsed_ms = elapsed.as_millis() as u64, "received reply");

        Ok(Reply {
            bytes: buf,
            elapsed,
        })
    }
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, Error> {
    let unresolved = || Error::Unresolved(format!("{}:{}", host, port));
    (host, port)
        .to_socket_addrs()
        .map_err(|e| {
            debug!(host, port, error = %e, "lookup failed");
            unresolved()
        })?
        .next()
        .ok_or_else(unresolved)
}
