use crate::client::Communicator;
use crate::collective::helpers::{check_pair, check_world, exchange_round, scratch};
use crate::error::Result;
use crate::memory::{Cells, CellsMut};
use crate::types::Rank;

/// Pairwise all-to-all: N-1 rounds of direct exchange.
///
/// In round `i` this rank sends cell `rank + i` of `send` to rank `rank + i`
/// and receives cell `rank - i` of `recv` from rank `rank - i` (both mod N).
/// Round `i` pairs every rank with the ranks `i` steps away on either side,
/// so after all rounds each ordered (source, destination) pair has been
/// served exactly once. The rank's own cell is copied locally first.
///
/// Both views must hold one cell per rank of `comm`, of equal size.
pub async fn pairwise_alltoall(
    comm: &Communicator,
    send: Cells<'_>,
    recv: &mut CellsMut<'_>,
) -> Result<()> {
    check_pair(comm, send.layout(), recv.layout())?;
    let world = comm.world_size() as usize;
    let rank = comm.rank() as usize;

    // Round 0: local copy.
    recv.cell_at_mut(rank).copy_from_slice(send.cell_at(rank));

    for round in 1..world {
        let send_to = (rank + round) % world;
        let recv_from = (rank + world - round) % world;
        exchange_round(
            comm.channel(),
            "pairwise",
            round,
            send_to as Rank,
            send.cell_at(send_to),
            recv_from as Rank,
            recv.cell_at_mut(recv_from),
        )
        .await?;
    }

    Ok(())
}

/// Pairwise all-to-all where the send and receive data share `buf`.
///
/// Cells are overwritten as rounds complete while later rounds still need
/// to send from them, so the outgoing data is snapshotted first.
pub async fn pairwise_alltoall_in_place(comm: &Communicator, buf: &mut CellsMut<'_>) -> Result<()> {
    check_world(comm, "in-place", buf.layout())?;
    let layout = *buf.layout();
    let mut snapshot = scratch(layout.total_bytes())?;
    snapshot.extend_from_slice(buf.as_bytes());
    let send = Cells::new(layout, &snapshot, "send")?;
    pairwise_alltoall(comm, send, buf).await
}
