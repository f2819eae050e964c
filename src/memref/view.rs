use crate::error::{ContainerError, Result};
use crate::memref::buffer::BufferHandle;
use crate::memref::descriptor::MemRefDescriptor;
use bytemuck::Pod;
use std::marker::PhantomData;
use std::ops::{Deref, Index, IndexMut};

/// Non-owning handle whose lifetime is tied to a borrowed slice.
///
/// Safe counterpart of [`BufferHandle::from_raw_parts`]: the borrow checker
/// enforces that the slice outlives the view. Dereferences to the underlying
/// handle for read access.
pub struct BufferView<'a, T, const N: usize> {
    handle: BufferHandle<T, N>,
    _data: PhantomData<&'a mut [T]>,
}

impl<'a, T: Pod, const N: usize> BufferView<'a, T, N> {
    /// View the first `product(sizes)` elements of `data` with the given extents.
    pub fn new(sizes: [usize; N], data: &'a mut [T]) -> Result<Self> {
        let expected = sizes
            .iter()
            .try_fold(1usize, |acc, &size| acc.checked_mul(size))
            .ok_or_else(|| ContainerError::ShapeOverflow {
                sizes: sizes.to_vec(),
            })?;
        if data.len() < expected {
            return Err(ContainerError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }
        // SAFETY: `data` holds at least `expected` elements and stays
        // mutably borrowed for `'a`, which bounds the view's lifetime.
        let handle = unsafe { BufferHandle::from_raw_parts(sizes, data.as_mut_ptr())? };
        Ok(Self {
            handle,
            _data: PhantomData,
        })
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.handle.as_mut_slice()
    }

    pub fn descriptor_mut_ptr(&mut self) -> *mut MemRefDescriptor<T, N> {
        self.handle.descriptor_mut_ptr()
    }

    /// Owned deep copy of the viewed elements.
    pub fn to_owned(&self) -> BufferHandle<T, N> {
        self.handle.clone()
    }
}

impl<T: Pod, const N: usize> Deref for BufferView<'_, T, N> {
    type Target = BufferHandle<T, N>;

    fn deref(&self) -> &BufferHandle<T, N> {
        &self.handle
    }
}

impl<T: Pod, const N: usize> Index<usize> for BufferView<'_, T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.handle[index]
    }
}

impl<T: Pod, const N: usize> IndexMut<usize> for BufferView<'_, T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.handle[index]
    }
}

impl<T: Pod, const N: usize> Index<[usize; N]> for BufferView<'_, T, N> {
    type Output = T;

    fn index(&self, index: [usize; N]) -> &T {
        &self.handle[index]
    }
}

impl<T: Pod, const N: usize> IndexMut<[usize; N]> for BufferView<'_, T, N> {
    fn index_mut(&mut self, index: [usize; N]) -> &mut T {
        &mut self.handle[index]
    }
}
