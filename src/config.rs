use std::time::Duration;

/// Master server the original launcher asks by default.
pub const DEFAULT_MASTER: (&str, u16) = ("mancubus.net", 15000);

/// Tunables shared by the clients and the bulk refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// How long to wait for the single reply datagram. Defaults to 10 seconds.
    pub timeout: Duration,
    /// Size of the receive buffer; longer datagrams are cut to this length by the OS. Defaults to 65535.
    pub recv_buffer: usize,
    /// Upper bound on concurrent queries during a bulk refresh. Defaults to 8.
    pub workers: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            timeout: Duration::from_secs(10),
            recv_buffer: 65535,
            workers: 8,
        }
    }
}

impl QueryConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_recv_buffer(mut self, len: usize) -> Self {
        self.recv_buffer = len;
        self
    }

    /// Sets the worker bound. Zero is treated as one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}
