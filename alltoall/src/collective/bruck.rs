use crate::client::Communicator;
use crate::collective::helpers::{
    check_pair, check_world, exchange_round, scratch, scratch_zeroed,
};
use crate::error::{ExchangeError, Result};
use crate::memory::{Cells, CellsMut};
use crate::types::Rank;

/// Bruck (recursive-doubling) all-to-all: log2(N) rounds.
///
/// `send` is first copied into `recv`; everything after that operates on
/// `recv` alone. Requires a power-of-two world size, and both views must
/// hold one cell per rank of `comm`, of equal size.
pub async fn bruck_alltoall(
    comm: &Communicator,
    send: Cells<'_>,
    recv: &mut CellsMut<'_>,
) -> Result<()> {
    check_pair(comm, send.layout(), recv.layout())?;
    recv.copy_from(&send)?;
    bruck_alltoall_in_place(comm, recv).await
}

/// Bruck all-to-all over a buffer that holds the outgoing cells on entry
/// (cell `d` destined for rank `d`) and the incoming cells on return
/// (cell `s` sent by rank `s`).
///
/// Layout through the phases, for rank `r` of `N`:
///
/// 1. Rotate left by `r`: cell `k` now holds the payload for rank `r + k`,
///    i.e. the payload still has to travel `k` hops to the right.
/// 2. For `stride` = 1, 2, 4, ..: every cell whose index has the `stride`
///    bit set moves `stride` ranks to the right, keeping its index. After
///    the last round each payload has travelled exactly its index, so cell
///    `k` holds the payload that rank `r - k` addressed to `r`.
/// 3. Rotate left by `r + 1` and reverse the cell order, which maps cell
///    `k` to index `r - k` (mod N): cell `s` holds rank `s`'s payload.
pub async fn bruck_alltoall_in_place(comm: &Communicator, buf: &mut CellsMut<'_>) -> Result<()> {
    let world_size = comm.world_size();
    if !world_size.is_power_of_two() {
        return Err(ExchangeError::NotPowerOfTwo { world_size });
    }
    check_world(comm, "in-place", buf.layout())?;
    let world = world_size as usize;
    let rank = comm.rank() as usize;

    // Each round forwards exactly half of the cells.
    let half_bytes = (world / 2) * buf.layout().cell_bytes();
    let mut gathered = scratch(half_bytes)?;
    let mut incoming = scratch_zeroed(half_bytes)?;

    buf.rotate_left(rank);

    let mut stride = 1;
    let mut round = 1;
    while stride < world {
        let send_to = (rank + stride) % world;
        let recv_from = (rank + world - stride) % world;

        let len = buf.gather(stride, &mut gathered);

        let inbox = &mut incoming[..len];
        exchange_round(
            comm.channel(),
            "bruck",
            round,
            send_to as Rank,
            &gathered,
            recv_from as Rank,
            inbox,
        )
        .await?;
        buf.scatter(stride, inbox)?;

        stride *= 2;
        round += 1;
    }

    buf.rotate_left(rank + 1);
    buf.reverse();
    Ok(())
}
