//! In-process full mesh over `tokio::io::duplex` pipes.

use crate::transport::StreamChannel;
use crate::types::Rank;

/// Build one [`StreamChannel`] per rank, fully connected.
///
/// Each ordered pair of ranks gets its own byte pipe holding at most
/// `capacity` bytes in flight; writers block when it is full. A capacity
/// smaller than one cell models a transport with no buffering.
pub fn memory_mesh(world_size: u32, capacity: usize) -> Vec<StreamChannel> {
    let mut channels: Vec<StreamChannel> = (0..world_size).map(StreamChannel::new).collect();
    for a in 0..world_size {
        for b in (a + 1)..world_size {
            let (end_a, end_b) = tokio::io::duplex(capacity.max(1));
            let (read_a, write_a) = tokio::io::split(end_a);
            let (read_b, write_b) = tokio::io::split(end_b);
            channels[a as usize].add_peer(b as Rank, read_a, write_a);
            channels[b as usize].add_peer(a as Rank, read_b, write_b);
        }
    }
    tracing::debug!(world_size, capacity, "built in-process channel mesh");
    channels
}
