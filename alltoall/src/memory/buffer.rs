//! Bounds-checked cell views over a rank's send and receive buffers.
//!
//! A view pairs a byte slice with its [`CellLayout`]; every accessor works in
//! whole cells so callers never compute raw byte offsets themselves.

use super::layout::CellLayout;
use super::scan::block_scan;
use crate::error::{ExchangeError, Result};

/// Read-only cell view, used for the send side.
#[derive(Debug, Clone, Copy)]
pub struct Cells<'a> {
    layout: CellLayout,
    bytes: &'a [u8],
}

impl<'a> Cells<'a> {
    /// Wrap `bytes`, which must be exactly `layout.total_bytes()` long.
    pub fn new(layout: CellLayout, bytes: &'a [u8], name: &'static str) -> Result<Self> {
        layout.check_len(name, bytes.len())?;
        Ok(Self { layout, bytes })
    }

    pub fn layout(&self) -> &CellLayout {
        &self.layout
    }

    /// Bytes of cell `index`.
    ///
    /// # Panics
    /// Panics if `index >= num_cells`.
    pub fn cell_at(&self, index: usize) -> &'a [u8] {
        &self.bytes[self.layout.cell_range(index)]
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

/// Mutable cell view, used for the receive side.
#[derive(Debug)]
pub struct CellsMut<'a> {
    layout: CellLayout,
    bytes: &'a mut [u8],
}

impl<'a> CellsMut<'a> {
    /// Wrap `bytes`, which must be exactly `layout.total_bytes()` long.
    pub fn new(layout: CellLayout, bytes: &'a mut [u8], name: &'static str) -> Result<Self> {
        layout.check_len(name, bytes.len())?;
        Ok(Self { layout, bytes })
    }

    pub fn layout(&self) -> &CellLayout {
        &self.layout
    }

    /// # Panics
    /// Panics if `index >= num_cells`.
    pub fn cell_at(&self, index: usize) -> &[u8] {
        &self.bytes[self.layout.cell_range(index)]
    }

    /// # Panics
    /// Panics if `index >= num_cells`.
    pub fn cell_at_mut(&mut self, index: usize) -> &mut [u8] {
        let range = self.layout.cell_range(index);
        &mut self.bytes[range]
    }

    /// Overwrite every cell with the contents of `src`, which must cover
    /// the same number of bytes.
    pub fn copy_from(&mut self, src: &Cells<'_>) -> Result<()> {
        if src.as_bytes().len() != self.bytes.len() {
            return Err(ExchangeError::BufferSizeMismatch {
                buffer: "copy source",
                expected: self.bytes.len(),
                actual: src.as_bytes().len(),
            });
        }
        self.bytes.copy_from_slice(src.as_bytes());
        Ok(())
    }

    /// Rotate the ring of cells left by `k`: cell `k` becomes cell 0.
    pub fn rotate_left(&mut self, k: usize) {
        let k = k % self.layout.num_cells();
        self.bytes.rotate_left(self.layout.cell_offset(k));
    }

    /// Reverse the order of cells; bytes within a cell keep their order.
    pub fn reverse(&mut self) {
        let n = self.layout.num_cells();
        let cell_bytes = self.layout.cell_bytes();
        for i in 0..n / 2 {
            let j = n - 1 - i;
            let (head, tail) = self.bytes.split_at_mut(self.layout.cell_offset(j));
            head[self.layout.cell_range(i)].swap_with_slice(&mut tail[..cell_bytes]);
        }
    }

    /// Append the cells selected by `block_scan(num_cells, stride)` to `out`,
    /// in order, after clearing it. Returns the number of bytes gathered.
    pub fn gather(&self, stride: usize, out: &mut Vec<u8>) -> usize {
        out.clear();
        for cells in block_scan(self.layout.num_cells(), stride) {
            out.extend_from_slice(&self.bytes[self.layout.byte_range(cells)]);
        }
        out.len()
    }

    /// Inverse of [`gather`](Self::gather): write `input` back over the same
    /// cells, in the same order.
    pub fn scatter(&mut self, stride: usize, input: &[u8]) -> Result<()> {
        let scan = block_scan(self.layout.num_cells(), stride);
        let expected = scan.cell_count() * self.layout.cell_bytes();
        if input.len() != expected {
            return Err(ExchangeError::BufferSizeMismatch {
                buffer: "scatter",
                expected,
                actual: input.len(),
            });
        }
        let mut consumed = 0;
        for cells in scan {
            let range = self.layout.byte_range(cells);
            let len = range.len();
            self.bytes[range].copy_from_slice(&input[consumed..consumed + len]);
            consumed += len;
        }
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bytes
    }
}
