//! All-to-all personalized exchange over point-to-point byte channels.
//!
//! Every rank holds a buffer of `world_size` equal cells, cell `d` addressed
//! to rank `d`. After [`Communicator::all_to_all`] cell `s` of every rank's
//! receive buffer holds what rank `s` addressed to it. Two algorithms are
//! provided: pairwise exchange (N-1 rounds) and Bruck's recursive doubling
//! (log2 N rounds, power-of-two worlds only). Both produce byte-identical
//! results.

pub mod client;
pub mod collective;
pub mod config;
pub mod error;
pub mod memory;
pub mod transport;
pub mod types;

pub use client::{Communicator, SyncCommunicator};
pub use config::ExchangeConfig;
pub use error::{ErrorKind, ExchangeError, Result};
pub use memory::{CellLayout, Cells, CellsMut};
pub use transport::{Channel, StreamChannel};
pub use types::{Algorithm, Direction, Rank};
