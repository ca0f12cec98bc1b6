use crate::config::ExchangeConfig;
use crate::error::{ExchangeError, Result};
use crate::transport::Channel;
use crate::types::{Algorithm, Rank};
use std::sync::Arc;

/// The local rank's view of an exchange group: who it is, how many ranks
/// there are, and how to reach them.
///
/// Everything an algorithm needs is carried here rather than in process-wide
/// state, so several communicators (for example one per simulated rank in a
/// test) can coexist in one process.
///
/// # Example
///
/// ```no_run
/// use alltoall::{Algorithm, Communicator, ExchangeConfig};
///
/// # async fn example() -> alltoall::Result<()> {
/// let comms = Communicator::bootstrap_memory(4, ExchangeConfig::default())?;
/// assert_eq!(comms[2].rank(), 2);
/// assert_eq!(comms[2].world_size(), 4);
/// # Ok(())
/// # }
/// ```
pub struct Communicator {
    rank: Rank,
    world_size: u32,
    channel: Arc<dyn Channel>,
    config: ExchangeConfig,
}

impl Communicator {
    /// Wrap a channel that reaches every other rank of a `world_size` group.
    pub fn new(rank: Rank, world_size: u32, channel: Arc<dyn Channel>) -> Result<Self> {
        Self::with_config(rank, world_size, channel, ExchangeConfig::default())
    }

    pub fn with_config(
        rank: Rank,
        world_size: u32,
        channel: Arc<dyn Channel>,
        config: ExchangeConfig,
    ) -> Result<Self> {
        if world_size == 0 {
            return Err(ExchangeError::InvalidWorldSize { world_size });
        }
        if rank >= world_size {
            return Err(ExchangeError::InvalidRank { rank, world_size });
        }
        Ok(Self {
            rank,
            world_size,
            channel,
            config,
        })
    }

    /// This communicator's rank (0-indexed).
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Total number of ranks in the group.
    pub fn world_size(&self) -> u32 {
        self.world_size
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// The channel used to reach peers.
    pub fn channel(&self) -> &dyn Channel {
        &*self.channel
    }

    /// All-to-all over raw byte buffers. See [`crate::collective::alltoall`].
    pub async fn all_to_all(
        &self,
        send: &[u8],
        recv: &mut [u8],
        entries_per_cell: usize,
        bytes_per_entry: usize,
        algorithm: Algorithm,
    ) -> Result<()> {
        crate::collective::alltoall(
            self,
            send,
            recv,
            entries_per_cell,
            bytes_per_entry,
            algorithm,
        )
        .await
    }

    /// All-to-all where `buf` is both the send and the receive buffer.
    pub async fn all_to_all_in_place(
        &self,
        buf: &mut [u8],
        entries_per_cell: usize,
        bytes_per_entry: usize,
        algorithm: Algorithm,
    ) -> Result<()> {
        crate::collective::alltoall_in_place(self, buf, entries_per_cell, bytes_per_entry, algorithm)
            .await
    }
}

impl std::fmt::Debug for Communicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Communicator")
            .field("rank", &self.rank)
            .field("world_size", &self.world_size)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
