//! Full mesh of TCP connections, one per pair of ranks.
//!
//! Every rank listens on its own address, accepts connections from higher
//! ranks and dials lower ranks. The dialer opens each connection with its
//! rank as a 4-byte little-endian handshake so the acceptor can tell which
//! peer it is talking to regardless of accept order.

use crate::config::ExchangeConfig;
use crate::error::{ExchangeError, Result};
use crate::transport::StreamChannel;
use crate::types::Rank;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Bind a listener, mapping errors to transport errors.
pub async fn tcp_listen(addr: SocketAddr) -> Result<(TcpListener, SocketAddr)> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ExchangeError::transport_with_source(format!("tcp listen on {addr}"), e))?;
    let local = listener
        .local_addr()
        .map_err(|e| ExchangeError::transport_with_source("tcp local_addr", e))?;
    Ok((listener, local))
}

/// Join a multi-process mesh as `rank`.
///
/// `addrs[i]` is the listen address of rank `i`; this rank binds
/// `addrs[rank]`. Fails if the mesh is not complete within
/// `config.connect_timeout`.
pub async fn tcp_connect(
    rank: Rank,
    addrs: &[SocketAddr],
    config: &ExchangeConfig,
) -> Result<StreamChannel> {
    let world_size = world_size_of(addrs)?;
    let own = *addrs.get(rank as usize).ok_or(ExchangeError::InvalidRank {
        rank,
        world_size,
    })?;
    let (listener, _) = tcp_listen(own).await?;
    tcp_connect_with_listener(rank, listener, addrs, config).await
}

/// Join a mesh using an already-bound listener for `rank`.
pub async fn tcp_connect_with_listener(
    rank: Rank,
    listener: TcpListener,
    addrs: &[SocketAddr],
    config: &ExchangeConfig,
) -> Result<StreamChannel> {
    let world_size = world_size_of(addrs)?;
    if rank >= world_size {
        return Err(ExchangeError::InvalidRank { rank, world_size });
    }

    let accept = accept_higher(rank, world_size, &listener);
    let dial = dial_lower(rank, addrs, config);
    let formation = async { tokio::try_join!(accept, dial) };

    let (accepted, dialed) = tokio::time::timeout(config.connect_timeout, formation)
        .await
        .map_err(|_| {
            ExchangeError::transport(format!(
                "rank {rank}: tcp mesh not formed after {}s",
                config.connect_timeout.as_secs()
            ))
        })??;

    let mut channel = StreamChannel::new(rank);
    for (peer, stream) in accepted.into_iter().chain(dialed) {
        let (reader, writer) = stream.into_split();
        channel.add_peer(peer, reader, writer);
    }
    tracing::debug!(rank, world_size, "tcp mesh formed");
    Ok(channel)
}

/// Form a loopback mesh of `world_size` ranks inside this process.
pub async fn tcp_bootstrap_local(
    world_size: u32,
    config: &ExchangeConfig,
) -> Result<Vec<StreamChannel>> {
    if world_size == 0 {
        return Err(ExchangeError::InvalidWorldSize { world_size });
    }
    let loopback: SocketAddr = ([127, 0, 0, 1], 0).into();
    let mut listeners = Vec::with_capacity(world_size as usize);
    let mut addrs = Vec::with_capacity(world_size as usize);
    for _ in 0..world_size {
        let (listener, addr) = tcp_listen(loopback).await?;
        listeners.push(listener);
        addrs.push(addr);
    }

    let joins = listeners
        .into_iter()
        .enumerate()
        .map(|(rank, listener)| tcp_connect_with_listener(rank as Rank, listener, &addrs, config));
    futures::future::try_join_all(joins).await
}

fn world_size_of(addrs: &[SocketAddr]) -> Result<u32> {
    let world_size = u32::try_from(addrs.len())
        .map_err(|_| ExchangeError::InvalidConfig(format!("{} ranks is too many", addrs.len())))?;
    if world_size == 0 {
        return Err(ExchangeError::InvalidWorldSize { world_size });
    }
    Ok(world_size)
}

async fn accept_higher(
    rank: Rank,
    world_size: u32,
    listener: &TcpListener,
) -> Result<Vec<(Rank, TcpStream)>> {
    let expected = (world_size - rank - 1) as usize;
    let mut accepted: Vec<(Rank, TcpStream)> = Vec::with_capacity(expected);
    while accepted.len() < expected {
        let (mut stream, remote) = listener
            .accept()
            .await
            .map_err(|e| ExchangeError::transport_with_source("tcp accept", e))?;
        stream.set_nodelay(true)?;
        let mut handshake = [0u8; 4];
        stream.read_exact(&mut handshake).await.map_err(|e| {
            ExchangeError::transport_with_source(format!("tcp handshake from {remote}"), e)
        })?;
        let peer = Rank::from_le_bytes(handshake);
        if peer <= rank || peer >= world_size {
            return Err(ExchangeError::transport(format!(
                "rank {rank}: unexpected handshake rank {peer} from {remote}"
            )));
        }
        if accepted.iter().any(|(r, _)| *r == peer) {
            return Err(ExchangeError::transport(format!(
                "rank {rank}: duplicate connection from rank {peer}"
            )));
        }
        tracing::trace!(rank, peer, %remote, "accepted peer");
        accepted.push((peer, stream));
    }
    Ok(accepted)
}

async fn dial_lower(
    rank: Rank,
    addrs: &[SocketAddr],
    config: &ExchangeConfig,
) -> Result<Vec<(Rank, TcpStream)>> {
    let mut dialed = Vec::with_capacity(rank as usize);
    for peer in 0..rank {
        let addr = addrs[peer as usize];
        let mut stream = connect_with_retry(addr, config).await?;
        stream.set_nodelay(true)?;
        stream.write_all(&rank.to_le_bytes()).await.map_err(|e| {
            ExchangeError::transport_with_source(format!("tcp handshake to {addr}"), e)
        })?;
        tracing::trace!(rank, peer, %addr, "dialed peer");
        dialed.push((peer, stream));
    }
    Ok(dialed)
}

/// Dial `addr`, retrying while nothing is listening there yet.
async fn connect_with_retry(addr: SocketAddr, config: &ExchangeConfig) -> Result<TcpStream> {
    loop {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
                tokio::time::sleep(config.connect_retry_interval).await;
            }
            Err(e) => {
                return Err(ExchangeError::transport_with_source(
                    format!("tcp connect to {addr}"),
                    e,
                ));
            }
        }
    }
}
