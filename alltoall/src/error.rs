use crate::types::{Direction, Rank};

pub type Result<T> = std::result::Result<T, ExchangeError>;

/// Coarse classification of an [`ExchangeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid input detected before any communication took place.
    Configuration,
    /// A send or receive did not move the requested bytes.
    Channel,
    /// Scratch-buffer allocation failed.
    Resource,
}

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("invalid world size {world_size}: at least one rank is required")]
    InvalidWorldSize { world_size: u32 },

    #[error("invalid rank {rank}: world size is {world_size}")]
    InvalidRank { rank: Rank, world_size: u32 },

    #[error(
        "invalid cell shape: {entries_per_cell} entries of {bytes_per_entry} bytes (both must be positive)"
    )]
    InvalidCellShape {
        entries_per_cell: usize,
        bytes_per_entry: usize,
    },

    #[error(
        "buffer layout overflows usize: {entries_per_cell} entries x {bytes_per_entry} bytes x {world_size} ranks"
    )]
    LayoutOverflow {
        entries_per_cell: usize,
        bytes_per_entry: usize,
        world_size: u32,
    },

    #[error("world size {world_size} is not a power of two (required by bruck)")]
    NotPowerOfTwo { world_size: u32 },

    #[error("{buffer} buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{buffer} buffer has {cells} cells but world size is {world_size}")]
    CellCountMismatch {
        buffer: &'static str,
        cells: usize,
        world_size: u32,
    },

    #[error("send cells are {send} bytes but recv cells are {recv} bytes")]
    CellSizeMismatch { send: usize, recv: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{operation} round {round}: {direction} with rank {peer} failed: {source}")]
    ChannelFailed {
        operation: &'static str,
        round: usize,
        peer: Rank,
        direction: Direction,
        #[source]
        source: Box<ExchangeError>,
    },

    #[error("short read from rank {peer}: expected {expected} bytes, got {received}")]
    ShortRead {
        peer: Rank,
        expected: usize,
        received: usize,
    },

    #[error("short write to rank {peer}: expected {expected} bytes, wrote {written}")]
    ShortWrite {
        peer: Rank,
        expected: usize,
        written: usize,
    },

    #[error("no channel to rank {rank}")]
    UnknownPeer { rank: Rank },

    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to allocate {bytes} bytes of scratch space")]
    ScratchAlloc {
        bytes: usize,
        #[source]
        source: std::collections::TryReserveError,
    },
}

impl ExchangeError {
    /// Create a `Transport` error with just a message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a `Transport` error with a message and a source error.
    pub fn transport_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Which part of the taxonomy this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidWorldSize { .. }
            | Self::InvalidRank { .. }
            | Self::InvalidCellShape { .. }
            | Self::LayoutOverflow { .. }
            | Self::NotPowerOfTwo { .. }
            | Self::BufferSizeMismatch { .. }
            | Self::CellCountMismatch { .. }
            | Self::CellSizeMismatch { .. }
            | Self::InvalidConfig(_) => ErrorKind::Configuration,
            Self::ChannelFailed { .. }
            | Self::ShortRead { .. }
            | Self::ShortWrite { .. }
            | Self::UnknownPeer { .. }
            | Self::Transport { .. }
            | Self::Io(_) => ErrorKind::Channel,
            Self::ScratchAlloc { .. } => ErrorKind::Resource,
        }
    }

    /// Round index of a failed collective round, if this error carries one.
    pub fn round(&self) -> Option<usize> {
        match self {
            Self::ChannelFailed { round, .. } => Some(*round),
            _ => None,
        }
    }
}
