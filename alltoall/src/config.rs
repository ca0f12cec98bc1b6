//! Runtime-configurable tuning parameters.
//!
//! All values have sensible defaults. Override via environment variables
//! (prefixed `ALLTOALL_`) or by constructing a custom `ExchangeConfig`.

use std::path::PathBuf;
use std::time::Duration;

/// Tuning parameters for algorithm selection and the bundled channels.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Largest cell (in bytes) for which `Algorithm::Auto` picks Bruck.
    pub bruck_max_cell_bytes: usize,

    /// Deadline for forming a TCP mesh.
    pub connect_timeout: Duration,

    /// Pause between connection attempts while a peer is not yet listening.
    pub connect_retry_interval: Duration,

    /// Directory holding the `pipe-<src>-<dst>` FIFOs.
    pub pipe_dir: PathBuf,

    /// Per-direction buffer size of the in-process duplex channels.
    pub memory_channel_bytes: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            bruck_max_cell_bytes: 4096,
            connect_timeout: Duration::from_secs(30),
            connect_retry_interval: Duration::from_millis(50),
            pipe_dir: PathBuf::from("/tmp"),
            memory_channel_bytes: 64 * 1024, // 64 KiB
        }
    }
}

impl ExchangeConfig {
    /// Load config from environment variables, falling back to defaults.
    ///
    /// Recognized variables:
    /// - `ALLTOALL_BRUCK_MAX_CELL_BYTES`
    /// - `ALLTOALL_CONNECT_TIMEOUT_SECS`
    /// - `ALLTOALL_CONNECT_RETRY_MS`
    /// - `ALLTOALL_PIPE_DIR`
    /// - `ALLTOALL_MEMORY_CHANNEL_BYTES`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(n) = parse_var::<usize>(&lookup, "ALLTOALL_BRUCK_MAX_CELL_BYTES") {
            cfg.bruck_max_cell_bytes = n;
        }
        if let Some(s) = parse_var::<u64>(&lookup, "ALLTOALL_CONNECT_TIMEOUT_SECS") {
            cfg.connect_timeout = Duration::from_secs(s);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "ALLTOALL_CONNECT_RETRY_MS") {
            cfg.connect_retry_interval = Duration::from_millis(ms);
        }
        if let Some(dir) = lookup("ALLTOALL_PIPE_DIR") {
            cfg.pipe_dir = PathBuf::from(dir);
        }
        if let Some(n) = parse_var::<usize>(&lookup, "ALLTOALL_MEMORY_CHANNEL_BYTES") {
            // A zero-capacity duplex would never make progress.
            cfg.memory_channel_bytes = n.max(1);
        }

        cfg
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable config value");
            None
        }
    }
}
