//! alltoall CLI - run a personalized all-to-all exchange.
//!
//! Every rank fills its send buffer with its own rank id, so after the
//! exchange cell `s` of every receive buffer holds `s`.

use alltoall::{Algorithm, CellLayout, Communicator, ExchangeConfig, Rank};
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "alltoall", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one rank of a multi-process exchange
    Rank {
        /// This rank's id
        #[arg(short, long)]
        rank: Rank,

        /// Number of ranks taking part
        #[arg(short = 'n', long)]
        num_procs: u32,

        /// Entries (i32) per cell
        #[arg(short, long, default_value = "1")]
        entries_per_cell: usize,

        /// Algorithm to use (pairwise, bruck, auto)
        #[arg(short, long, default_value = "pairwise")]
        algorithm: Algorithm,

        /// Channel between the processes
        #[arg(short, long, value_enum, default_value = "fifo")]
        transport: TransportKind,

        /// Listen address of every rank, in rank order (tcp only)
        #[arg(long, value_delimiter = ',')]
        addrs: Vec<SocketAddr>,

        /// Directory holding the FIFOs (fifo only)
        #[arg(long)]
        pipe_dir: Option<PathBuf>,

        /// Create missing FIFOs before opening them (fifo only)
        #[arg(long)]
        create_fifos: bool,
    },

    /// Run every rank inside this process over loopback TCP and verify
    Local {
        /// Number of ranks taking part
        #[arg(short = 'n', long)]
        num_procs: u32,

        /// Entries (i32) per cell
        #[arg(short, long, default_value = "1")]
        entries_per_cell: usize,

        /// Algorithm to use (pairwise, bruck, auto)
        #[arg(short, long, default_value = "pairwise")]
        algorithm: Algorithm,
    },
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum TransportKind {
    Fifo,
    Tcp,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ExchangeConfig::from_env();
    match Cli::parse().command {
        Commands::Rank {
            rank,
            num_procs,
            entries_per_cell,
            algorithm,
            transport,
            addrs,
            pipe_dir,
            create_fifos,
        } => {
            let comm = match transport {
                TransportKind::Tcp => {
                    if addrs.len() != num_procs as usize {
                        bail!(
                            "--addrs lists {} addresses for {num_procs} ranks",
                            addrs.len()
                        );
                    }
                    Communicator::connect_tcp(rank, &addrs, config)
                        .await
                        .context("joining tcp group")?
                }
                TransportKind::Fifo => open_fifo(rank, num_procs, config, pipe_dir, create_fifos)?,
            };
            run_rank(&comm, entries_per_cell, algorithm).await?;
        }
        Commands::Local {
            num_procs,
            entries_per_cell,
            algorithm,
        } => {
            let comms = Communicator::bootstrap_tcp_local(num_procs, config)
                .await
                .context("building loopback group")?;
            let mut handles = Vec::new();
            for comm in comms {
                handles.push(tokio::spawn(async move {
                    let recv = run_rank(&comm, entries_per_cell, algorithm).await?;
                    verify(comm.rank(), &recv, entries_per_cell)
                }));
            }
            for h in handles {
                h.await??;
            }
            tracing::info!(num_procs, %algorithm, "all ranks verified");
        }
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn open_fifo(
    rank: Rank,
    num_procs: u32,
    mut config: ExchangeConfig,
    pipe_dir: Option<PathBuf>,
    create: bool,
) -> anyhow::Result<Communicator> {
    if let Some(dir) = pipe_dir {
        config.pipe_dir = dir;
    }
    if create {
        alltoall::transport::fifo::create_fifos(&config.pipe_dir, num_procs)
            .context("creating fifos")?;
    }
    Communicator::open_fifo(rank, num_procs, config).context("opening fifos")
}

#[cfg(not(target_os = "linux"))]
fn open_fifo(
    _rank: Rank,
    _num_procs: u32,
    _config: ExchangeConfig,
    _pipe_dir: Option<PathBuf>,
    _create: bool,
) -> anyhow::Result<Communicator> {
    bail!("the fifo transport is only available on linux")
}

/// Exchange a buffer filled with this rank's id and return what arrived.
async fn run_rank(
    comm: &Communicator,
    entries_per_cell: usize,
    algorithm: Algorithm,
) -> anyhow::Result<Vec<i32>> {
    let rank = comm.rank();
    let len = buffer_len(entries_per_cell, comm.world_size())?;
    let send = vec![rank as i32; len];
    let mut recv = vec![0i32; len];

    tracing::info!(rank, data = ?send, "initial data");
    comm.all_to_all_typed(&send, &mut recv, entries_per_cell, algorithm)
        .await
        .with_context(|| format!("rank {rank}: {algorithm} exchange"))?;
    tracing::info!(rank, data = ?recv, "final data");
    Ok(recv)
}

/// Entries in one rank's buffer, validated before anything is allocated.
fn buffer_len(entries_per_cell: usize, num_procs: u32) -> anyhow::Result<usize> {
    let layout = CellLayout::new(num_procs, entries_per_cell, std::mem::size_of::<i32>())
        .context("invalid buffer shape")?;
    Ok(layout.entries_per_cell() * layout.num_cells())
}

fn verify(rank: Rank, recv: &[i32], entries_per_cell: usize) -> anyhow::Result<()> {
    for (src, cell) in recv.chunks(entries_per_cell).enumerate() {
        if cell.iter().any(|&v| v != src as i32) {
            bail!("rank {rank}: cell {src} holds {cell:?}");
        }
    }
    Ok(())
}
