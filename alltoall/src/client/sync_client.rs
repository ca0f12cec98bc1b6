use crate::config::ExchangeConfig;
use crate::error::{ExchangeError, Result};
use crate::types::{Algorithm, Rank};
use std::net::SocketAddr;

use super::Communicator;

/// Blocking wrapper around [`Communicator`].
///
/// Owns a `tokio::runtime::Runtime` and calls `block_on()` for each operation.
pub struct SyncCommunicator {
    inner: Communicator,
    rt: tokio::runtime::Runtime,
}

fn new_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ExchangeError::transport_with_source("tokio runtime", e))
}

impl SyncCommunicator {
    /// Build an in-process group and return one blocking communicator per
    /// rank. Drive each from its own thread.
    pub fn bootstrap_memory(world_size: u32, config: ExchangeConfig) -> Result<Vec<Self>> {
        // In-memory pipes are not bound to a reactor, so every rank can run
        // on its own runtime.
        Communicator::bootstrap_memory(world_size, config)?
            .into_iter()
            .map(Self::from_async)
            .collect()
    }

    /// Join a multi-process TCP group as `rank`.
    pub fn connect_tcp(rank: Rank, addrs: &[SocketAddr], config: ExchangeConfig) -> Result<Self> {
        let rt = new_runtime()?;
        let inner = rt.block_on(Communicator::connect_tcp(rank, addrs, config))?;
        Ok(Self { inner, rt })
    }

    /// Wrap an existing async communicator with a new runtime.
    ///
    /// The communicator's channel must not depend on another runtime's
    /// reactor.
    pub fn from_async(inner: Communicator) -> Result<Self> {
        Ok(Self {
            inner,
            rt: new_runtime()?,
        })
    }

    pub fn rank(&self) -> Rank {
        self.inner.rank()
    }

    pub fn world_size(&self) -> u32 {
        self.inner.world_size()
    }

    /// Blocking [`Communicator::all_to_all`].
    pub fn all_to_all(
        &self,
        send: &[u8],
        recv: &mut [u8],
        entries_per_cell: usize,
        bytes_per_entry: usize,
        algorithm: Algorithm,
    ) -> Result<()> {
        self.rt.block_on(self.inner.all_to_all(
            send,
            recv,
            entries_per_cell,
            bytes_per_entry,
            algorithm,
        ))
    }

    /// Blocking [`Communicator::all_to_all_in_place`].
    pub fn all_to_all_in_place(
        &self,
        buf: &mut [u8],
        entries_per_cell: usize,
        bytes_per_entry: usize,
        algorithm: Algorithm,
    ) -> Result<()> {
        self.rt.block_on(
            self.inner
                .all_to_all_in_place(buf, entries_per_cell, bytes_per_entry, algorithm),
        )
    }

    /// Blocking [`Communicator::all_to_all_typed`].
    pub fn all_to_all_typed<T: bytemuck::Pod>(
        &self,
        send: &[T],
        recv: &mut [T],
        count: usize,
        algorithm: Algorithm,
    ) -> Result<()> {
        self.rt
            .block_on(self.inner.all_to_all_typed(send, recv, count, algorithm))
    }

    /// Blocking [`Communicator::all_to_all_typed_in_place`].
    pub fn all_to_all_typed_in_place<T: bytemuck::Pod>(
        &self,
        buf: &mut [T],
        count: usize,
        algorithm: Algorithm,
    ) -> Result<()> {
        self.rt
            .block_on(self.inner.all_to_all_typed_in_place(buf, count, algorithm))
    }

    /// Access the underlying async communicator.
    pub fn inner(&self) -> &Communicator {
        &self.inner
    }
}
