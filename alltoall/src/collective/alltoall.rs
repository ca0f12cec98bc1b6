//! Entry points that validate a request, pick the algorithm and run it.

use crate::client::Communicator;
use crate::collective::bruck::{bruck_alltoall, bruck_alltoall_in_place};
use crate::collective::pairwise::{pairwise_alltoall, pairwise_alltoall_in_place};
use crate::error::{ExchangeError, Result};
use crate::memory::{CellLayout, Cells, CellsMut};
use crate::types::Algorithm;

/// All-to-all personalized exchange.
///
/// `send` and `recv` each hold `world_size` cells of
/// `entries_per_cell * bytes_per_entry` bytes. On entry cell `d` of `send`
/// is the payload for rank `d`; on return cell `s` of `recv` is the payload
/// rank `s` addressed to this rank.
///
/// Inputs are validated before any communication. Any channel failure
/// aborts the operation; `recv` is then in an unspecified intermediate
/// state and the exchange cannot be resumed, only rerun.
pub async fn alltoall(
    comm: &Communicator,
    send: &[u8],
    recv: &mut [u8],
    entries_per_cell: usize,
    bytes_per_entry: usize,
    algorithm: Algorithm,
) -> Result<()> {
    let (layout, algorithm) = plan(comm, entries_per_cell, bytes_per_entry, algorithm)?;
    let send = Cells::new(layout, send, "send")?;
    let mut recv = CellsMut::new(layout, recv, "recv")?;

    log_start(comm, &layout, algorithm, false);
    let result = match algorithm {
        Algorithm::Bruck => bruck_alltoall(comm, send, &mut recv).await,
        // `plan` never yields `Auto`.
        Algorithm::Pairwise | Algorithm::Auto => pairwise_alltoall(comm, send, &mut recv).await,
    };
    log_finish(comm, algorithm, &result);
    result
}

/// All-to-all where send and receive data share one buffer.
pub async fn alltoall_in_place(
    comm: &Communicator,
    buf: &mut [u8],
    entries_per_cell: usize,
    bytes_per_entry: usize,
    algorithm: Algorithm,
) -> Result<()> {
    let (layout, algorithm) = plan(comm, entries_per_cell, bytes_per_entry, algorithm)?;
    let mut cells = CellsMut::new(layout, buf, "in-place")?;

    log_start(comm, &layout, algorithm, true);
    let result = match algorithm {
        Algorithm::Bruck => bruck_alltoall_in_place(comm, &mut cells).await,
        Algorithm::Pairwise | Algorithm::Auto => {
            pairwise_alltoall_in_place(comm, &mut cells).await
        }
    };
    log_finish(comm, algorithm, &result);
    result
}

/// Validate the cell shape and resolve `Auto` against the world size.
fn plan(
    comm: &Communicator,
    entries_per_cell: usize,
    bytes_per_entry: usize,
    algorithm: Algorithm,
) -> Result<(CellLayout, Algorithm)> {
    let world_size = comm.world_size();
    let layout = CellLayout::new(world_size, entries_per_cell, bytes_per_entry)?;
    let algorithm = algorithm.resolve(
        world_size,
        layout.cell_bytes(),
        comm.config().bruck_max_cell_bytes,
    );
    if algorithm == Algorithm::Bruck && !world_size.is_power_of_two() {
        return Err(ExchangeError::NotPowerOfTwo { world_size });
    }
    Ok((layout, algorithm))
}

fn log_start(comm: &Communicator, layout: &CellLayout, algorithm: Algorithm, in_place: bool) {
    tracing::debug!(
        rank = comm.rank(),
        world_size = comm.world_size(),
        %algorithm,
        cell_bytes = layout.cell_bytes(),
        in_place,
        "alltoall start"
    );
}

fn log_finish(comm: &Communicator, algorithm: Algorithm, result: &Result<()>) {
    match result {
        Ok(()) => tracing::debug!(rank = comm.rank(), %algorithm, "alltoall done"),
        Err(e) => tracing::warn!(rank = comm.rank(), %algorithm, error = %e, "alltoall failed"),
    }
}
