mod alltoall;
mod bruck;
mod helpers;
mod pairwise;

pub use alltoall::{alltoall, alltoall_in_place};
pub use bruck::{bruck_alltoall, bruck_alltoall_in_place};
pub use pairwise::{pairwise_alltoall, pairwise_alltoall_in_place};
