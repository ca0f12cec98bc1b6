//! Typed wrappers over the byte-level collectives.
//!
//! Any [`bytemuck::Pod`] element type can be exchanged; the entry size is
//! taken from the type instead of being passed separately.

use crate::error::Result;
use crate::types::Algorithm;

use super::Communicator;

impl Communicator {
    /// All-to-all over typed slices. Each cell holds `count` elements, so
    /// both slices must be `count * world_size` long.
    pub async fn all_to_all_typed<T: bytemuck::Pod>(
        &self,
        send: &[T],
        recv: &mut [T],
        count: usize,
        algorithm: Algorithm,
    ) -> Result<()> {
        self.all_to_all(
            bytemuck::cast_slice(send),
            bytemuck::cast_slice_mut(recv),
            count,
            std::mem::size_of::<T>(),
            algorithm,
        )
        .await
    }

    /// In-place all-to-all over a typed slice.
    pub async fn all_to_all_typed_in_place<T: bytemuck::Pod>(
        &self,
        buf: &mut [T],
        count: usize,
        algorithm: Algorithm,
    ) -> Result<()> {
        self.all_to_all_in_place(
            bytemuck::cast_slice_mut(buf),
            count,
            std::mem::size_of::<T>(),
            algorithm,
        )
        .await
    }
}
