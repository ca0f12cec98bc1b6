use crate::error::{ExchangeError, Result};
use crate::transport::Channel;
use crate::types::Rank;
use futures::future::BoxFuture;
use std::collections::HashMap;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Both directions of the byte stream to one peer, independently lockable so
/// a send and a receive to the same peer can progress concurrently.
struct PeerStream {
    reader: Mutex<BoxedReader>,
    writer: Mutex<BoxedWriter>,
}

/// [`Channel`] over one `AsyncRead`/`AsyncWrite` pair per peer.
pub struct StreamChannel {
    rank: Rank,
    peers: HashMap<Rank, PeerStream>,
}

impl StreamChannel {
    /// An empty channel table for `rank`; attach peers with [`add_peer`](Self::add_peer).
    pub fn new(rank: Rank) -> Self {
        Self {
            rank,
            peers: HashMap::new(),
        }
    }

    /// Register the stream halves used to talk to `peer`, replacing any
    /// previous registration.
    pub fn add_peer<R, W>(&mut self, peer: Rank, reader: R, writer: W)
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        self.peers.insert(
            peer,
            PeerStream {
                reader: Mutex::new(Box::new(reader)),
                writer: Mutex::new(Box::new(writer)),
            },
        );
    }

    /// Rank of the local end.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Ranks this channel can reach, in ascending order.
    pub fn peer_ranks(&self) -> Vec<Rank> {
        let mut ranks: Vec<Rank> = self.peers.keys().copied().collect();
        ranks.sort_unstable();
        ranks
    }

    fn peer(&self, rank: Rank) -> Result<&PeerStream> {
        self.peers
            .get(&rank)
            .ok_or(ExchangeError::UnknownPeer { rank })
    }

    async fn write_all_to(&self, peer: Rank, data: &[u8]) -> Result<()> {
        let stream = self.peer(peer)?;
        let mut writer = stream.writer.lock().await;
        let mut written = 0;
        while written < data.len() {
            match writer.write(&data[written..]).await {
                Ok(0) => {
                    return Err(ExchangeError::ShortWrite {
                        peer,
                        expected: data.len(),
                        written,
                    });
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(ExchangeError::transport_with_source(
                        format!("write to rank {peer} after {written}/{} bytes", data.len()),
                        e,
                    ));
                }
            }
        }
        writer.flush().await.map_err(|e| {
            ExchangeError::transport_with_source(format!("flush to rank {peer}"), e)
        })?;
        Ok(())
    }

    async fn read_exact_from(&self, peer: Rank, buf: &mut [u8]) -> Result<()> {
        let stream = self.peer(peer)?;
        let mut reader = stream.reader.lock().await;
        let mut received = 0;
        while received < buf.len() {
            match reader.read(&mut buf[received..]).await {
                Ok(0) => {
                    return Err(ExchangeError::ShortRead {
                        peer,
                        expected: buf.len(),
                        received,
                    });
                }
                Ok(n) => received += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(ExchangeError::transport_with_source(
                        format!(
                            "read from rank {peer} after {received}/{} bytes",
                            buf.len()
                        ),
                        e,
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Channel for StreamChannel {
    fn send<'a>(&'a self, peer: Rank, data: &'a [u8]) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.write_all_to(peer, data))
    }

    fn recv<'a>(&'a self, peer: Rank, buf: &'a mut [u8]) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.read_exact_from(peer, buf))
    }
}

impl std::fmt::Debug for StreamChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamChannel")
            .field("rank", &self.rank)
            .field("peers", &self.peer_ranks())
            .finish()
    }
}
