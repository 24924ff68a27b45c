//! Command line front end for the launcher query protocol.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use odamex_server_query::{QueryConfig, ServerBrowser, ServerStatus, DEFAULT_MASTER};

#[derive(Parser)]
#[command(name = "odaquery")]
#[command(about = "Query an Odamex master server and the game servers it lists", long_about = None)]
#[command(version)]
struct Cli {
    /// Milliseconds to wait for each reply
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,

    /// Maximum number of servers queried at once
    #[arg(long, default_value_t = 8)]
    workers: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the master server list
    Master {
        /// Master server as host:port
        #[arg(long)]
        master: Option<String>,
    },

    /// Query one game server
    Server {
        /// Game server as host:port
        address: String,
    },

    /// Fetch the master list, then query every server on it
    List {
        /// Master server as host:port
        #[arg(long)]
        master: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = QueryConfig::default()
        .with_timeout(Duration::from_millis(cli.timeout_ms))
        .with_workers(cli.workers);
    let mut browser = ServerBrowser::new(config);

    match cli.command {
        Commands::Master { master } => {
            let (host, port) = master_address(master.as_deref())?;
            for entry in browser.update_master(&host, port)? {
                println!("{}", entry);
            }
        }
        Commands::Server { address } => {
            let (host, port) = split_host_port(&address)?;
            let status = browser
                .refresh_one(&host, port)
                .with_context(|| format!("cannot find server {}", address))?;
            println!("{}", status_row(&status, &address));
        }
        Commands::List { master } => {
            let (host, port) = master_address(master.as_deref())?;
            let count = browser
                .update_master(&host, port)
                .with_context(|| format!("master server {}:{} did not answer", host, port))?
                .len();
            if count == 0 {
                println!("no servers");
                return Ok(());
            }
            for outcome in browser.refresh_all()? {
                match &outcome.result {
                    Ok(status) => println!("{}", status_row(status, &outcome.key)),
                    Err(_) => println!("{}", outcome.log_line()),
                }
            }
        }
    }
    Ok(())
}

fn master_address(arg: Option<&str>) -> Result<(String, u16)> {
    match arg {
        Some(address) => split_host_port(address),
        None => Ok((DEFAULT_MASTER.0.to_string(), DEFAULT_MASTER.1)),
    }
}

fn split_host_port(address: &str) -> Result<(String, u16)> {
    let (host, port) = address
        .rsplit_once(':')
        .filter(|(host, _)| !host.is_empty())
        .ok_or_else(|| anyhow!("bad syntax: expected host:port, got {:?}", address))?;
    let port = port
        .parse()
        .with_context(|| format!("bad syntax: invalid port in {:?}", address))?;
    Ok((host.to_string(), port))
}

fn status_row(status: &ServerStatus, address: &str) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
        status.title(),
        status.players_display(),
        status.map(),
        status.iwad(),
        status.pwads_joined(),
        status.ping_millis(),
        address
    )
}
