//! Named-pipe channels between ranks on one host.
//!
//! Rank `src` writes to rank `dst` through the FIFO `<dir>/pipe-<src>-<dst>`.
//! Both ends are opened in read-write mode, which Linux permits for FIFOs,
//! so opening never waits for the peer process and a reader never sees a
//! spurious end-of-file before the writer shows up.

use crate::error::{ExchangeError, Result};
use crate::transport::StreamChannel;
use crate::types::Rank;
use nix::errno::Errno;
use nix::sys::stat::Mode;
use std::path::{Path, PathBuf};
use tokio::net::unix::pipe;

/// Path of the FIFO carrying bytes from `src` to `dst`.
pub fn fifo_path(dir: &Path, src: Rank, dst: Rank) -> PathBuf {
    dir.join(format!("pipe-{src}-{dst}"))
}

/// Create every `pipe-<src>-<dst>` FIFO for a world of `world_size` ranks.
///
/// FIFOs that already exist are left alone, so every rank may call this.
pub fn create_fifos(dir: &Path, world_size: u32) -> Result<()> {
    for src in 0..world_size {
        for dst in 0..world_size {
            if src == dst {
                continue;
            }
            let path = fifo_path(dir, src, dst);
            match nix::unistd::mkfifo(&path, Mode::S_IRUSR | Mode::S_IWUSR) {
                Ok(()) | Err(Errno::EEXIST) => {}
                Err(e) => {
                    return Err(ExchangeError::transport_with_source(
                        format!("mkfifo {}", path.display()),
                        e,
                    ));
                }
            }
        }
    }
    tracing::debug!(dir = %dir.display(), world_size, "fifos ready");
    Ok(())
}

/// Open the FIFOs connecting `rank` to every other rank.
///
/// Must be called from within a tokio runtime.
pub fn open_fifo_channel(dir: &Path, rank: Rank, world_size: u32) -> Result<StreamChannel> {
    if rank >= world_size {
        return Err(ExchangeError::InvalidRank { rank, world_size });
    }
    let mut opts = pipe::OpenOptions::new();
    opts.read_write(true);

    let mut channel = StreamChannel::new(rank);
    for peer in (0..world_size).filter(|&p| p != rank) {
        let outgoing = fifo_path(dir, rank, peer);
        let incoming = fifo_path(dir, peer, rank);
        let writer = opts.open_sender(&outgoing).map_err(|e| {
            ExchangeError::transport_with_source(format!("open {}", outgoing.display()), e)
        })?;
        let reader = opts.open_receiver(&incoming).map_err(|e| {
            ExchangeError::transport_with_source(format!("open {}", incoming.display()), e)
        })?;
        channel.add_peer(peer, reader, writer);
    }
    Ok(channel)
}
