//! Stride-aware attribute views.
//!
//! Billboard attributes can come from a packed array, from a field inside an
//! array of interleaved structs, or from a single value shared by the whole
//! batch. [`StridedView`] covers all three: element `i` is read at byte
//! `i * stride`, and a stride of zero keeps returning the same value.

use std::marker::PhantomData;

use bytemuck::Pod;

#[derive(Debug, Clone, Copy)]
pub struct StridedView<'a, T> {
    bytes: &'a [u8],
    stride: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: Pod> StridedView<'a, T> {
    /// One element after another (`stride = size_of::<T>()`).
    pub fn packed(values: &'a [T]) -> Self {
        Self {
            bytes: bytemuck::cast_slice(values),
            stride: size_of::<T>(),
            _marker: PhantomData,
        }
    }

    /// The same value for every element (`stride = 0`).
    pub fn uniform(value: &'a T) -> Self {
        Self {
            bytes: bytemuck::bytes_of(value),
            stride: 0,
            _marker: PhantomData,
        }
    }

    /// A `T` field at byte `offset` inside records that are `stride` bytes apart.
    ///
    /// `bytes` starts at the first record. Reads are unaligned.
    pub fn interleaved(bytes: &'a [u8], offset: usize, stride: usize) -> Self {
        let bytes = bytes.get(offset..).unwrap_or(&[]);
        Self {
            bytes,
            stride,
            _marker: PhantomData,
        }
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn is_uniform(&self) -> bool {
        self.stride == 0
    }

    /// Number of elements that can be read, `usize::MAX` for uniform views.
    pub fn available(&self) -> usize {
        let size = size_of::<T>();
        if self.bytes.len() < size {
            0
        } else if self.stride == 0 {
            usize::MAX
        } else {
            (self.bytes.len() - size) / self.stride + 1
        }
    }

    pub fn get(&self, index: usize) -> Option<T> {
        let start = index.checked_mul(self.stride)?;
        let end = start.checked_add(size_of::<T>())?;
        self.bytes
            .get(start..end)
            .map(bytemuck::pod_read_unaligned)
    }

    /// Iterates over the first `count` elements, stopping early if the view
    /// runs out.
    pub fn iter(&self, count: usize) -> impl Iterator<Item = T> + '_ {
        (0..count).map_while(|i| self.get(i))
    }
}
