use crate::error::ExchangeError;

/// Rank of a participant in the exchange (0-indexed).
pub type Rank = u32;

/// Which half of a round's point-to-point pair an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Send,
    Recv,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Send => f.write_str("send"),
            Direction::Recv => f.write_str("recv"),
        }
    }
}

/// All-to-all strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// N-1 rounds, one cell per round, direct to the final destination.
    #[default]
    Pairwise,
    /// log2(N) rounds of recursive doubling. Requires a power-of-two world.
    Bruck,
    /// Pick one of the above from the world size and cell size.
    Auto,
}

impl Algorithm {
    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Algorithm::Pairwise => "pairwise",
            Algorithm::Bruck => "bruck",
            Algorithm::Auto => "auto",
        }
    }

    /// Resolve `Auto` to a concrete algorithm.
    ///
    /// Bruck wins while cells are small enough that per-round latency
    /// dominates; it is never chosen for a world that is not a power of two.
    pub fn resolve(self, world_size: u32, cell_bytes: usize, bruck_max_cell_bytes: usize) -> Self {
        match self {
            Algorithm::Auto => {
                if world_size.is_power_of_two() && cell_bytes <= bruck_max_cell_bytes {
                    Algorithm::Bruck
                } else {
                    Algorithm::Pairwise
                }
            }
            other => other,
        }
    }

    /// Number of channel round-trips each rank performs.
    ///
    /// `Auto` has no fixed count; resolve it first.
    pub fn rounds(self, world_size: u32) -> Option<usize> {
        match self {
            Algorithm::Pairwise => Some(world_size.saturating_sub(1) as usize),
            Algorithm::Bruck if world_size.is_power_of_two() => {
                Some(world_size.trailing_zeros() as usize)
            }
            Algorithm::Bruck | Algorithm::Auto => None,
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Algorithm {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pairwise" => Ok(Algorithm::Pairwise),
            "bruck" | "doubling" | "bruck-doubling" => Ok(Algorithm::Bruck),
            "auto" => Ok(Algorithm::Auto),
            other => Err(ExchangeError::InvalidConfig(format!(
                "unknown algorithm {other:?} (expected pairwise, bruck or auto)"
            ))),
        }
    }
}
