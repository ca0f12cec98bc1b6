//! Point-to-point byte channels consumed by the exchange algorithms.
//!
//! The algorithms only need a reliable, ordered, full-duplex byte stream to
//! every other rank. [`Channel`] is that seam; [`StreamChannel`] implements it
//! over any `AsyncRead`/`AsyncWrite` pair, and the submodules build full
//! meshes of stream channels out of in-process pipes, TCP sockets or FIFOs.

use crate::error::Result;
use crate::types::Rank;
use futures::future::BoxFuture;
use std::sync::Arc;

#[cfg(target_os = "linux")]
pub mod fifo;
pub mod memory;
mod stream;
pub mod tcp;

pub use memory::memory_mesh;
pub use stream::StreamChannel;

/// Reliable ordered byte transport from the local rank to each peer.
///
/// Implementations must either move exactly the requested number of bytes
/// or fail. A send and a receive on the same peer may be in flight at the
/// same time; the algorithms rely on that to avoid deadlocking on
/// unbuffered transports.
pub trait Channel: Send + Sync {
    /// Send all of `data` to `peer`.
    ///
    /// Resolves once the transport has accepted every byte. A zero-length
    /// write before that point is reported as
    /// [`ShortWrite`](crate::ExchangeError::ShortWrite).
    fn send<'a>(&'a self, peer: Rank, data: &'a [u8]) -> BoxFuture<'a, Result<()>>;

    /// Fill `buf` with exactly `buf.len()` bytes from `peer`.
    ///
    /// End-of-stream before the buffer is full is reported as
    /// [`ShortRead`](crate::ExchangeError::ShortRead).
    fn recv<'a>(&'a self, peer: Rank, buf: &'a mut [u8]) -> BoxFuture<'a, Result<()>>;
}

impl<T: Channel + ?Sized> Channel for Arc<T> {
    fn send<'a>(&'a self, peer: Rank, data: &'a [u8]) -> BoxFuture<'a, Result<()>> {
        (**self).send(peer, data)
    }

    fn recv<'a>(&'a self, peer: Rank, buf: &'a mut [u8]) -> BoxFuture<'a, Result<()>> {
        (**self).recv(peer, buf)
    }
}
