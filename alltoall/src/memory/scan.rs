use std::ops::Range;

/// Iterator over the cell ranges a recursive-doubling round forwards.
///
/// The buffer is walked in blocks of `2 * stride` cells and the second half
/// of each block is yielded: exactly the cells whose index has the `stride`
/// bit set. Ranges are clamped to `num_cells`, so the last block may be short
/// when `num_cells` is not a multiple of `2 * stride`.
#[derive(Debug, Clone)]
pub struct BlockScan {
    next: usize,
    stride: usize,
    num_cells: usize,
}

/// Start a fresh scan over `num_cells` cells at doubling distance `stride`.
///
/// # Panics
/// Panics if `stride` is zero.
pub fn block_scan(num_cells: usize, stride: usize) -> BlockScan {
    assert!(stride > 0, "block_scan stride must be positive");
    BlockScan {
        next: stride,
        stride,
        num_cells,
    }
}

impl BlockScan {
    /// Total number of cells the scan will yield.
    pub fn cell_count(&self) -> usize {
        self.clone().map(|r| r.len()).sum()
    }
}

impl Iterator for BlockScan {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Range<usize>> {
        if self.next >= self.num_cells {
            return None;
        }
        let start = self.next;
        let end = (start + self.stride).min(self.num_cells);
        self.next = start.saturating_add(2 * self.stride);
        Some(start..end)
    }
}

impl std::iter::FusedIterator for BlockScan {}
