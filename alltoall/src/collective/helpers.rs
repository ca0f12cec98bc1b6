use crate::client::Communicator;
use crate::error::{ExchangeError, Result};
use crate::memory::CellLayout;
use crate::transport::Channel;
use crate::types::{Direction, Rank};

/// Reject a cell view that does not hold exactly one cell per rank.
pub(crate) fn check_world(
    comm: &Communicator,
    buffer: &'static str,
    layout: &CellLayout,
) -> Result<()> {
    if layout.world_size() != comm.world_size() {
        return Err(ExchangeError::CellCountMismatch {
            buffer,
            cells: layout.num_cells(),
            world_size: comm.world_size(),
        });
    }
    Ok(())
}

/// Reject send and receive views that cannot be paired cell for cell.
pub(crate) fn check_pair(comm: &Communicator, send: &CellLayout, recv: &CellLayout) -> Result<()> {
    check_world(comm, "send", send)?;
    check_world(comm, "recv", recv)?;
    if send.cell_bytes() != recv.cell_bytes() {
        return Err(ExchangeError::CellSizeMismatch {
            send: send.cell_bytes(),
            recv: recv.cell_bytes(),
        });
    }
    Ok(())
}

/// One round of a collective: send `outgoing` to `send_to` while receiving
/// exactly `incoming.len()` bytes from `recv_from`.
///
/// Both directions progress concurrently so that ranks paired with each
/// other never wait on each other's send, even over unbuffered transports.
/// The first failure wins and cancels the other direction; it is reported
/// with the round, peer and direction it happened on.
pub(crate) async fn exchange_round(
    channel: &dyn Channel,
    operation: &'static str,
    round: usize,
    send_to: Rank,
    outgoing: &[u8],
    recv_from: Rank,
    incoming: &mut [u8],
) -> Result<()> {
    tracing::trace!(
        operation,
        round,
        send_to,
        send_bytes = outgoing.len(),
        recv_from,
        recv_bytes = incoming.len(),
        "exchange round"
    );
    let send = async {
        channel
            .send(send_to, outgoing)
            .await
            .map_err(|e| round_failed(operation, round, send_to, Direction::Send, e))
    };
    let recv = async {
        channel
            .recv(recv_from, incoming)
            .await
            .map_err(|e| round_failed(operation, round, recv_from, Direction::Recv, e))
    };
    tokio::try_join!(send, recv)?;
    Ok(())
}

fn round_failed(
    operation: &'static str,
    round: usize,
    peer: Rank,
    direction: Direction,
    source: ExchangeError,
) -> ExchangeError {
    ExchangeError::ChannelFailed {
        operation,
        round,
        peer,
        direction,
        source: Box::new(source),
    }
}

/// Empty scratch buffer able to hold `bytes` without reallocating.
pub(crate) fn scratch(bytes: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(bytes)
        .map_err(|source| ExchangeError::ScratchAlloc { bytes, source })?;
    Ok(buf)
}

/// Zero-filled scratch buffer of exactly `bytes`.
pub(crate) fn scratch_zeroed(bytes: usize) -> Result<Vec<u8>> {
    let mut buf = scratch(bytes)?;
    buf.resize(bytes, 0);
    Ok(buf)
}
