//! Status queries against individual game servers.

use tracing::{debug, trace};

use crate::config::QueryConfig;
use crate::cursor::PacketCursor;
use crate::error::{Error, ParseError};
use crate::transport::UdpTransport;
use crate::{challenge_request, SERVER_MAGIC};

/// Live status reported by one game server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerStatus {
    title: String,
    players: u8,
    max_players: u8,
    map: String,
    iwad: String,
    pwads: Vec<String>,
    ping_millis: u64,
}

impl ServerStatus {
    /// Name the server advertises.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of players currently on the server.
    pub fn players(&self) -> u8 {
        self.players
    }

    /// Maximum number of players allowed on the server.
    pub fn max_players(&self) -> u8 {
        self.max_players
    }

    /// `players/max_players`, as shown in the server list.
    pub fn players_display(&self) -> String {
        format!("{}/{}", self.players, self.max_players)
    }

    /// Map currently being played.
    pub fn map(&self) -> &str {
        &self.map
    }

    /// Primary game data file clients must load.
    pub fn iwad(&self) -> &str {
        &self.iwad
    }

    /// Additional data files clients must load, in the order the server listed them.
    pub fn pwads(&self) -> &[String] {
        &self.pwads
    }

    /// All PWAD names run together with no separator.
    ///
    /// This is the legacy single-field view older front ends display and pass on a game command line. It is lossy:
    /// `["ab", "c"]` and `["a", "bc"]` both come out as `"abc"`. Use [`pwads`](Self::pwads) to get the names back.
    pub fn pwads_joined(&self) -> String {
        self.pwads.concat()
    }

    /// Round-trip time of the query that produced this status, measured locally.
    pub fn ping_millis(&self) -> u64 {
        self.ping_millis
    }
}

/// Parses a game server reply. `ping_millis` is the locally measured round-trip time; the server does not send one.
pub fn parse_server_response(response: &[u8], ping_millis: u64) -> Result<ServerStatus, ParseError> {
    // server reply datagram looks like this:
    // * Magic (4 bytes, LE); should be 5560020
    // * Title (Null-terminated string)
    // * Current number of players (1 byte)
    // * Maximum number of players (1 byte)
    // * Map (Null-terminated string)
    // * IWAD (Null-terminated string)
    // * PWAD count (1 byte)
    // * PWADs (PWAD count null-terminated strings)
    // Anything after the last PWAD is ignored.
    let mut cursor = PacketCursor::new(response);
    cursor.expect_magic(SERVER_MAGIC)?;

    let title = cursor.read_string()?;
    let players = cursor.read_u8()?;
    let max_players = cursor.read_u8()?;
    let map = cursor.read_string()?;
    let iwad = cursor.read_string()?;

    let pwad_count = cursor.read_u8()?;
    let pwads = (0..pwad_count)
        .map(|_| cursor.read_string())
        .collect::<Result<Vec<_>, _>>()?;

    trace!(%title, players, max_players, %map, %iwad, pwads = pwads.len(), "decoded server status");

    Ok(ServerStatus {
        title,
        players,
        max_players,
        map,
        iwad,
        pwads,
        ping_millis,
    })
}

/// Queries the status of game servers.
///
/// This uses blocking IO. The client holds no per-query state, so one value can be copied into as many threads as
/// needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerClient {
    transport: UdpTransport,
}

impl ServerClient {
    pub fn new(config: &QueryConfig) -> Self {
        ServerClient {
            transport: UdpTransport::new(config),
        }
    }

    /// Asks the game server at `host:port` for its status.
    pub fn refresh(&self, host: &str, port: u16) -> Result<ServerStatus, Error> {
        let reply = self.transport.query(host, port, &challenge_request())?;
        let status = parse_server_response(&reply.bytes, reply.elapsed_millis())?;
        debug!(host, port, title = status.title(), ping_ms = status.ping_millis(), "server refreshed");
        Ok(status)
    }
}
