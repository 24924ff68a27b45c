//! **Odamex launcher query protocol**, used for finding game servers through a master server and asking each of them
//! for its status.
//!
//! Both requests are the same 4-byte challenge sent over UDP; each side answers with a single datagram.
//!
//! If you are looking for high-level components that handle the IO by themselves, see [`MasterClient`],
//! [`ServerClient`] and [`ServerBrowser`]. If you want to handle IO by yourself, [`challenge_request`] and the response
//! parsers ([`parse_master_response`], [`parse_server_response`]) may be useful.
//!
//! # Examples
//!
//! ## Using [`ServerBrowser`]
//! ```no_run
//! use odamex_server_query::{QueryConfig, ServerBrowser, DEFAULT_MASTER};
//! # use odamex_server_query::error::Error;
//!
//! # fn main() -> Result<(), Error> {
//! let mut browser = ServerBrowser::new(QueryConfig::default());
//! let (host, port) = DEFAULT_MASTER;
//! browser.update_master(host, port)?;
//!
//! for outcome in browser.refresh_all()? {
//!     println!("{}", outcome.log_line());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Using the request constructor and parsers
//! ```no_run
//! use std::net::UdpSocket;
//! use odamex_server_query::{challenge_request, parse_server_response};
//! # use odamex_server_query::error::Error;
//!
//! # fn main() -> Result<(), Error> {
//! let sock = UdpSocket::bind("0.0.0.0:0")?;
//! sock.connect("127.0.0.1:10666")?;
//! let mut buf = vec![0u8; 65535];
//!
//! sock.send(&challenge_request())?;
//! let len = sock.recv(&mut buf[..])?;
//! let status = parse_server_response(&buf[..len], 0)?;
//!
//! println!("{} {} {}", status.title(), status.players_display(), status.map());
//! # Ok(())
//! # }
//! ```

pub mod error;

pub mod codec;
mod config;
pub mod cursor;
mod transport;

mod browser;
mod master;
mod server;

pub use browser::{refresh_many, RefreshOutcome, ServerBrowser};
pub use config::{QueryConfig, DEFAULT_MASTER};
pub use master::{parse_master_response, MasterClient, ServerListEntry};
pub use server::{parse_server_response, ServerClient, ServerStatus};
pub use transport::{Reply, UdpTransport};

/// Value sent as the whole request to both the master and game servers.
pub const CHALLENGE: u32 = 777_123;
/// First four bytes of every master reply.
pub const MASTER_MAGIC: u32 = 777_123;
/// First four bytes of every game server reply.
pub const SERVER_MAGIC: u32 = 5_560_020;

/// Constructs the challenge datagram understood by both master and game servers.
pub fn challenge_request() -> [u8; 4] {
    codec::write_u32(CHALLENGE)
}
