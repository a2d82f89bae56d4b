//! Typed errors for the simulation and persistence layers. Framing errors
//! live in `nethr_protocol::codec::CodecError`; these cover everything that
//! can go wrong once a packet has already been decoded.

use thiserror::Error;

/// Failures from the block-change store.
#[derive(Debug, Error)]
pub enum BlockChangeError {
    /// The log is at `MAX_BLOCK_CHANGES` and the attempted change was not a
    /// revert to the procedural base block.
    #[error("block change log is full")]
    LogFull,
    /// A chest placement needs 15 contiguous free records and none exist.
    #[error("no contiguous 15-record span free for chest storage")]
    NoChestSpan,
}

/// Failures from loading or writing `world.bin` / `world.meta`.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The underlying file could not be read or written.
    #[error("persistence i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// `world.meta` exists but a required line is missing or unparsable.
    #[error("malformed world.meta: {0}")]
    MalformedMeta(String),
}

/// Startup-fatal failures, surfaced to the bin crate as a non-zero exit.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The listening socket could not be bound.
    #[error("failed to bind listening socket on port {port}: {source}")]
    Bind {
        /// The port that was attempted.
        port: u16,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// The world file or meta file could not be opened or created.
    #[error("failed to open world storage: {0}")]
    Storage(#[from] PersistenceError),
}
