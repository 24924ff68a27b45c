use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("no reply within {} ms", .0.as_millis())]
    Timeout(Duration),
    #[error("could not resolve {0}")]
    Unresolved(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("no master server list has been fetched yet")]
    NoMasterList,
}

/// Ways a reply datagram can fail to decode.
///
/// None of these ever come with a partially decoded value.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    #[error("bad magic {found:#010x}, expected {expected:#010x}")]
    MagicMismatch { expected: u32, found: u32 },
    #[error("reply truncated at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("unterminated string starting at offset {offset}")]
    Unterminated { offset: usize },
}
