mod buffer;
mod layout;
mod scan;

pub use buffer::{Cells, CellsMut};
pub use layout::CellLayout;
pub use scan::{BlockScan, block_scan};
