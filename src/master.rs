//! The master server and the packed list of game servers it hands back.

use std::fmt;
use std::net::Ipv4Addr;

use tracing::{info, trace};

use crate::config::QueryConfig;
use crate::cursor::PacketCursor;
use crate::error::{Error, ParseError};
use crate::transport::UdpTransport;
use crate::{challenge_request, MASTER_MAGIC};

/// One game server announced by the master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServerListEntry {
    address: Ipv4Addr,
    port: u16,
}

impl ServerListEntry {
    pub fn new(address: Ipv4Addr, port: u16) -> Self {
        ServerListEntry { address, port }
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The `a.b.c.d:port` key results for this server are reported under.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ServerListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// Parses a master reply into the servers it lists, in the order the master sent them.
///
/// Index 0 of the result is the first record on the wire (the original launcher counted records from 1).
pub fn parse_master_response(response: &[u8]) -> Result<Vec<ServerListEntry>, ParseError> {
    // master reply datagram looks like this:
    // * Magic (4 bytes, LE); should be 777123
    // * Server count N (2 bytes, LE)
    // * N records of:
    //   * Address (4 bytes); each byte is one dotted-decimal octet, NOT a little-endian integer
    //   * Port (2 bytes, LE)
    // Anything after the last record is ignored.
    let mut cursor = PacketCursor::new(response);
    cursor.expect_magic(MASTER_MAGIC)?;
    let count = usize::from(cursor.read_u16()?);

    // Refuse a list that claims more records than were sent, rather than returning a prefix of it.
    let needed = count * 6;
    if cursor.remaining() < needed {
        return Err(ParseError::Truncated {
            offset: cursor.offset(),
            needed,
            available: cursor.remaining(),
        });
    }

    let mut servers = Vec::with_capacity(count);
    for _ in 0..count {
        let [a, b, c, d] = cursor.read_octets()?;
        let port = cursor.read_u16()?;
        servers.push(ServerListEntry::new(Ipv4Addr::new(a, b, c, d), port));
    }
    trace!(count, "decoded master list");
    Ok(servers)
}

/// Asks a master server for its list of game servers.
///
/// This uses blocking IO.
#[derive(Debug, Clone)]
pub struct MasterClient {
    transport: UdpTransport,
    has_run: bool,
}

impl Default for MasterClient {
    fn default() -> Self {
        MasterClient::new(&QueryConfig::default())
    }
}

impl MasterClient {
    pub fn new(config: &QueryConfig) -> Self {
        MasterClient {
            transport: UdpTransport::new(config),
            has_run: false,
        }
    }

    /// Whether any refresh has succeeded yet. A bulk refresh of known servers means nothing before this is `true`.
    pub fn has_run(&self) -> bool {
        self.has_run
    }

    /// Fetches the current list from the master at `host:port`.
    pub fn refresh(&mut self, host: &str, port: u16) -> Result<Vec<ServerListEntry>, Error> {
        let reply = self.transport.query(host, port, &challenge_request())?;
        let servers = parse_master_response(&reply.bytes)?;
        self.has_run = true;
        info!(host, port, count = servers.len(), "master list updated");
        Ok(servers)
    }
}
