//! Master-list bookkeeping and the bulk "refresh every known server" fan-out.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use tracing::{debug, warn};

use crate::config::QueryConfig;
use crate::error::Error;
use crate::master::{MasterClient, ServerListEntry};
use crate::server::{ServerClient, ServerStatus};

/// The result of querying one server during a bulk refresh.
#[derive(Debug)]
pub struct RefreshOutcome {
    /// `host:port` of the server that was asked.
    pub key: String,
    pub result: Result<ServerStatus, Error>,
}

impl RefreshOutcome {
    /// One line for a console-style log.
    pub fn log_line(&self) -> String {
        match &self.result {
            Ok(status) => format!("found server {} ({})", status.title(), self.key),
            Err(e) => format!("cannot find server {}: {}", self.key, e),
        }
    }
}

type Target = (String, u16);

// Takes the next target off the shared queue. A poisoned lock still holds a consistent queue, since nothing panics
// while it is held, so the remaining targets are still handed out.
fn next_target(queue: &Mutex<VecDeque<Target>>) -> Option<Target> {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
}

/// Queries every `(host, port)` in `targets` on at most `workers` threads.
///
/// Each target yields exactly one [`RefreshOutcome`] on the returned channel, in whatever order the queries finish.
/// The channel closes once every target has been answered or has failed. Dropping the receiver early makes the workers
/// stop after their current query.
pub fn refresh_many<I>(client: ServerClient, targets: I, workers: usize) -> Result<Receiver<RefreshOutcome>, Error>
where
    I: IntoIterator<Item = Target>,
{
    let queue: VecDeque<Target> = targets.into_iter().collect();
    let workers = workers.max(1).min(queue.len());
    debug!(targets = queue.len(), workers, "starting bulk refresh");

    let queue = Arc::new(Mutex::new(queue));
    let (tx, rx) = mpsc::channel();
    for id in 0..workers {
        let queue = Arc::clone(&queue);
        let tx = tx.clone();
        thread::Builder::new()
            .name(format!("refresh-{}", id))
            .spawn(move || loop {
                let (host, port) = match next_target(&queue) {
                    Some(target) => target,
                    None => break,
                };
                let key = format!("{}:{}", host, port);
                let result = client.refresh(&host, port);
                if let Err(e) = &result {
                    warn!(server = %key, error = %e, "refresh failed");
                }
                if tx.send(RefreshOutcome { key, result }).is_err() {
                    break;
                }
            })?;
    }
    Ok(rx)
}

/// Holds the most recent master list and refreshes the servers on it.
#[derive(Debug, Clone)]
pub struct ServerBrowser {
    config: QueryConfig,
    master: MasterClient,
    servers: ServerClient,
    known: Vec<ServerListEntry>,
}

impl Default for ServerBrowser {
    fn default() -> Self {
        ServerBrowser::new(QueryConfig::default())
    }
}

impl ServerBrowser {
    pub fn new(config: QueryConfig) -> Self {
        ServerBrowser {
            master: MasterClient::new(&config),
            servers: ServerClient::new(&config),
            config,
            known: Vec::new(),
        }
    }

    /// Whether a master list has ever been fetched.
    pub fn has_run(&self) -> bool {
        self.master.has_run()
    }

    /// Servers from the last successful master refresh.
    pub fn known(&self) -> &[ServerListEntry] {
        &self.known
    }

    /// Fetches a new list from the master at `host:port`.
    ///
    /// On success the stored list is replaced as a whole. On failure it is left as it was.
    pub fn update_master(&mut self, host: &str, port: u16) -> Result<&[ServerListEntry], Error> {
        self.known = self.master.refresh(host, port)?;
        Ok(&self.known)
    }

    /// Queries a single server. This does not need a master list.
    pub fn refresh_one(&self, host: &str, port: u16) -> Result<ServerStatus, Error> {
        self.servers.refresh(host, port)
    }

    /// Queries every server from the last master list. See [`refresh_many`] for how results are delivered.
    ///
    /// Fails with [`Error::NoMasterList`] until [`update_master`](Self::update_master) has succeeded once.
    pub fn refresh_all(&self) -> Result<Receiver<RefreshOutcome>, Error> {
        if !self.has_run() {
            return Err(Error::NoMasterList);
        }
        let targets = self
            .known
            .iter()
            .map(|entry| (entry.address().to_string(), entry.port()));
        refresh_many(self.servers, targets, self.config.workers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_all_needs_a_master_list() {
        let browser = ServerBrowser::default();
        assert!(!browser.has_run());
        assert!(matches!(browser.refresh_all(), Err(Error::NoMasterList)));
    }

    #[test]
    fn poisoned_queue_still_hands_out_targets() {
        let queue = Arc::new(Mutex::new(VecDeque::from(vec![
            ("10.0.0.1".to_string(), 1),
            ("10.0.0.2".to_string(), 2),
        ])));
        let poisoner = Arc::clone(&queue);
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the queue");
        })
        .join();
        assert!(queue.is_poisoned());

        assert_eq!(next_target(&queue), Some(("10.0.0.1".to_string(), 1)));
        assert_eq!(next_target(&queue), Some(("10.0.0.2".to_string(), 2)));
        assert_eq!(next_target(&queue), None);
    }

    #[test]
    fn no_targets_closes_immediately() {
        let rx = refresh_many(ServerClient::default(), Vec::new(), 4).unwrap();
        assert!(rx.recv().is_err());
    }

    #[test]
    fn log_line_names_the_failure() {
        let outcome = RefreshOutcome {
            key: "10.0.0.1:8080".to_string(),
            result: Err(Error::NoMasterList),
        };
        assert_eq!(
            outcome.log_line(),
            "cannot find server 10.0.0.1:8080: no master server list has been fetched yet"
        );
    }
}
