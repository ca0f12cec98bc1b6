use alltoall::transport::memory_mesh;
use alltoall::{Channel, Communicator, ExchangeConfig, Rank, Result};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Helper: run one task per rank of an in-process group, each owning its
/// communicator, and return the per-rank results in rank order.
pub async fn run_collective<F, Fut, T>(world_size: u32, f: F) -> Vec<T>
where
    F: Fn(Communicator) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let comms = Communicator::bootstrap_memory(world_size, ExchangeConfig::default()).unwrap();
    run_on(comms, f).await
}

/// Same as [`run_collective`] over caller-built communicators.
pub async fn run_on<F, Fut, T>(comms: Vec<Communicator>, f: F) -> Vec<T>
where
    F: Fn(Communicator) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let f = Arc::new(f);
    let mut handles = Vec::new();
    for comm in comms {
        let f = Arc::clone(&f);
        handles.push(tokio::spawn(async move { f(comm).await }));
    }
    let mut results = Vec::new();
    for h in handles {
        let joined = tokio::time::timeout(Duration::from_secs(20), h)
            .await
            .expect("rank task hung");
        results.push(joined.unwrap());
    }
    results
}

/// Entry `e` of the cell rank `src` addresses to rank `dst`.
pub fn value(src: usize, dst: usize, e: usize) -> u32 {
    (src * 10_000 + dst * 100 + e) as u32
}

/// Send buffer of `rank`: cell `d` holds `value(rank, d, ..)`.
pub fn send_buffer(rank: usize, world: usize, entries: usize) -> Vec<u32> {
    (0..world)
        .flat_map(|dst| (0..entries).map(move |e| value(rank, dst, e)))
        .collect()
}

/// Receive buffer `rank` must end with: cell `s` holds `value(s, rank, ..)`.
pub fn expected_recv(rank: usize, world: usize, entries: usize) -> Vec<u32> {
    (0..world)
        .flat_map(|src| (0..entries).map(move |e| value(src, rank, e)))
        .collect()
}

/// Channel wrapper counting the sends and receives issued through it.
pub struct CountingChannel {
    inner: Box<dyn Channel>,
    pub sends: AtomicUsize,
    pub recvs: AtomicUsize,
}

impl CountingChannel {
    pub fn new(inner: impl Channel + 'static) -> Self {
        Self {
            inner: Box::new(inner),
            sends: AtomicUsize::new(0),
            recvs: AtomicUsize::new(0),
        }
    }
}

impl Channel for CountingChannel {
    fn send<'a>(&'a self, peer: Rank, data: &'a [u8]) -> BoxFuture<'a, Result<()>> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        self.inner.send(peer, data)
    }

    fn recv<'a>(&'a self, peer: Rank, buf: &'a mut [u8]) -> BoxFuture<'a, Result<()>> {
        self.recvs.fetch_add(1, Ordering::SeqCst);
        self.inner.recv(peer, buf)
    }
}

/// In-process group whose channels count their operations.
pub fn counting_group(world_size: u32) -> (Vec<Communicator>, Vec<Arc<CountingChannel>>) {
    let mut comms = Vec::new();
    let mut counters = Vec::new();
    for channel in memory_mesh(world_size, 64 * 1024) {
        let rank = channel.rank();
        let counting = Arc::new(CountingChannel::new(channel));
        counters.push(Arc::clone(&counting));
        comms.push(Communicator::new(rank, world_size, counting).unwrap());
    }
    (comms, counters)
}
