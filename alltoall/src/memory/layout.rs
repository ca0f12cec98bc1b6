use crate::error::{ExchangeError, Result};
use std::ops::Range;

/// Shape of a rank's send/receive buffer: `world_size` equal cells of
/// `entries_per_cell * bytes_per_entry` bytes each, cell `i` at byte offset
/// `i * cell_bytes`.
///
/// All sizes are validated once at construction, so offsets computed from
/// an in-range cell index never overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellLayout {
    world_size: u32,
    entries_per_cell: usize,
    bytes_per_entry: usize,
    cell_bytes: usize,
    total_bytes: usize,
}

impl CellLayout {
    pub fn new(world_size: u32, entries_per_cell: usize, bytes_per_entry: usize) -> Result<Self> {
        if world_size == 0 {
            return Err(ExchangeError::InvalidWorldSize { world_size });
        }
        if entries_per_cell == 0 || bytes_per_entry == 0 {
            return Err(ExchangeError::InvalidCellShape {
                entries_per_cell,
                bytes_per_entry,
            });
        }
        let overflow = || ExchangeError::LayoutOverflow {
            entries_per_cell,
            bytes_per_entry,
            world_size,
        };
        let cell_bytes = entries_per_cell
            .checked_mul(bytes_per_entry)
            .ok_or_else(overflow)?;
        let total_bytes = cell_bytes
            .checked_mul(world_size as usize)
            .ok_or_else(overflow)?;
        Ok(Self {
            world_size,
            entries_per_cell,
            bytes_per_entry,
            cell_bytes,
            total_bytes,
        })
    }

    pub fn world_size(&self) -> u32 {
        self.world_size
    }

    /// Number of cells in a buffer (one per rank).
    pub fn num_cells(&self) -> usize {
        self.world_size as usize
    }

    pub fn entries_per_cell(&self) -> usize {
        self.entries_per_cell
    }

    pub fn bytes_per_entry(&self) -> usize {
        self.bytes_per_entry
    }

    pub fn cell_bytes(&self) -> usize {
        self.cell_bytes
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Byte offset of cell `index`.
    pub fn cell_offset(&self, index: usize) -> usize {
        index * self.cell_bytes
    }

    /// Byte range covered by cells `cells.start..cells.end`.
    pub fn byte_range(&self, cells: Range<usize>) -> Range<usize> {
        self.cell_offset(cells.start)..self.cell_offset(cells.end)
    }

    /// Byte range of a single cell.
    pub fn cell_range(&self, index: usize) -> Range<usize> {
        self.byte_range(index..index + 1)
    }

    /// Reject a buffer that is not exactly `total_bytes` long.
    pub fn check_len(&self, buffer: &'static str, actual: usize) -> Result<()> {
        if actual != self.total_bytes {
            return Err(ExchangeError::BufferSizeMismatch {
                buffer,
                expected: self.total_bytes,
                actual,
            });
        }
        Ok(())
    }
}
