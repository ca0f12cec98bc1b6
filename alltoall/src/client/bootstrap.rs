use crate::config::ExchangeConfig;
use crate::error::{ExchangeError, Result};
use crate::transport::{Channel, StreamChannel, memory_mesh, tcp};
use crate::types::Rank;
use std::net::SocketAddr;
use std::sync::Arc;

use super::Communicator;

impl Communicator {
    /// Build a fully connected group of `world_size` communicators inside
    /// this process, linked by in-memory pipes of
    /// `config.memory_channel_bytes` each.
    pub fn bootstrap_memory(world_size: u32, config: ExchangeConfig) -> Result<Vec<Self>> {
        if world_size == 0 {
            return Err(ExchangeError::InvalidWorldSize { world_size });
        }
        let mesh = memory_mesh(world_size, config.memory_channel_bytes);
        from_mesh(mesh, world_size, &config)
    }

    /// Build a group of `world_size` communicators inside this process,
    /// linked by loopback TCP connections.
    pub async fn bootstrap_tcp_local(world_size: u32, config: ExchangeConfig) -> Result<Vec<Self>> {
        let mesh = tcp::tcp_bootstrap_local(world_size, &config).await?;
        from_mesh(mesh, world_size, &config)
    }

    /// Join a multi-process TCP group as `rank`; `addrs[i]` is rank `i`'s
    /// listen address.
    pub async fn connect_tcp(
        rank: Rank,
        addrs: &[SocketAddr],
        config: ExchangeConfig,
    ) -> Result<Self> {
        let channel = tcp::tcp_connect(rank, addrs, &config).await?;
        Self::with_config(rank, addrs.len() as u32, Arc::new(channel), config)
    }

    /// Join a single-host group over the FIFOs in `config.pipe_dir`.
    ///
    /// The FIFOs must already exist (see
    /// [`create_fifos`](crate::transport::fifo::create_fifos)). Must be
    /// called from within a tokio runtime.
    #[cfg(target_os = "linux")]
    pub fn open_fifo(rank: Rank, world_size: u32, config: ExchangeConfig) -> Result<Self> {
        let channel =
            crate::transport::fifo::open_fifo_channel(&config.pipe_dir, rank, world_size)?;
        Self::with_config(rank, world_size, Arc::new(channel), config)
    }
}

fn from_mesh(
    mesh: Vec<StreamChannel>,
    world_size: u32,
    config: &ExchangeConfig,
) -> Result<Vec<Communicator>> {
    mesh.into_iter()
        .map(|channel| {
            let rank = channel.rank();
            let channel: Arc<dyn Channel> = Arc::new(channel);
            Communicator::with_config(rank, world_size, channel, config.clone())
        })
        .collect()
}
