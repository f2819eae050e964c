use crate::error::{ContainerError, Result};
use crate::memref::descriptor::{checked_extents, row_major_strides, MemRefDescriptor};
use bytemuck::Pod;
use log::debug;
use std::fmt;
use std::mem::{self, ManuallyDrop};
use std::ops::{Index, IndexMut};
use std::ptr;
use std::slice;

/// Ownership state of the storage behind a [`BufferHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// No storage attached
    Empty,
    /// The handle allocated its storage and frees it on drop
    Owned,
    /// The handle addresses caller-supplied storage and never frees it
    Borrowed,
}

/// N-dimensional row-major buffer handle of `T` elements.
///
/// The handle starts with a [`MemRefDescriptor`] and is `repr(C)`, so a
/// pointer to the handle is a valid descriptor pointer for compiled kernels.
/// Owned storage is released exactly once, on drop; borrowed storage is
/// never released.
///
/// Cloning always deep-copies into fresh owned storage. Moving transfers
/// ownership; [`BufferHandle::take`] moves the contents out and leaves an
/// empty handle behind.
#[repr(C)]
pub struct BufferHandle<T, const N: usize> {
    descriptor: MemRefDescriptor<T, N>,
    size: usize,
    storage: Storage,
}

impl<T: Pod, const N: usize> BufferHandle<T, N> {
    /// Empty handle: all extents zero, no storage.
    pub const fn new() -> Self {
        Self {
            descriptor: MemRefDescriptor::empty(),
            size: 0,
            storage: Storage::Empty,
        }
    }

    /// Allocate a zero-initialised handle with the given extents.
    ///
    /// Nothing is allocated when any extent is zero.
    pub fn with_sizes(sizes: [usize; N]) -> Result<Self> {
        let mut handle = Self::shaped(sizes)?;
        if handle.size > 0 {
            let data = bytemuck::allocation::try_zeroed_slice_box::<T>(handle.size)
                .map_err(|_| ContainerError::Allocation {
                    elements: handle.size,
                })?;
            handle.adopt(data);
        }
        debug!("Allocated buffer handle {:?} ({} elements)", sizes, handle.size);
        Ok(handle)
    }

    /// Take ownership of `data` laid out row-major with the given extents.
    pub fn from_vec(sizes: [usize; N], data: Vec<T>) -> Result<Self> {
        let mut handle = Self::shaped(sizes)?;
        if data.len() != handle.size {
            return Err(ContainerError::ShapeMismatch {
                expected: handle.size,
                actual: data.len(),
            });
        }
        if handle.size > 0 {
            handle.adopt(data.into_boxed_slice());
        }
        Ok(handle)
    }

    /// Non-owning handle over caller storage.
    ///
    /// # Safety
    ///
    /// `data` must be valid for reads and writes of `product(sizes)` elements
    /// for as long as the returned handle (or anything that reads through its
    /// descriptor) is alive, and must not be accessed through other
    /// references in the meantime. The handle never frees `data`.
    ///
    /// # Panics
    ///
    /// Panics when `data` is null and the shape is not empty.
    pub unsafe fn from_raw_parts(sizes: [usize; N], data: *mut T) -> Result<Self> {
        let mut handle = Self::shaped(sizes)?;
        assert!(
            !data.is_null() || handle.size == 0,
            "non-owning handle over {} elements needs a non-null data pointer",
            handle.size
        );
        handle.descriptor.aligned = data;
        if !data.is_null() {
            handle.storage = Storage::Borrowed;
        }
        Ok(handle)
    }

    /// Deep copy of the data addressed by a kernel-produced descriptor.
    ///
    /// Strides and offset are honoured; the result is always row-major and
    /// owned. The descriptor's storage is left untouched.
    ///
    /// # Safety
    ///
    /// Every element addressed by `descriptor` must be readable.
    pub unsafe fn copy_from_descriptor(descriptor: &MemRefDescriptor<T, N>) -> Result<Self> {
        let mut sizes = [0usize; N];
        for (size, &extent) in sizes.iter_mut().zip(descriptor.sizes.iter()) {
            *size = usize::try_from(extent).map_err(|_| {
                ContainerError::Other(format!("negative extent {extent} in kernel descriptor"))
            })?;
        }
        let mut handle = Self::with_sizes(sizes)?;
        if handle.size == 0 {
            return Ok(handle);
        }

        // SAFETY: the caller guarantees the descriptor addresses readable memory.
        let base = unsafe { descriptor.aligned.offset(descriptor.offset) };
        if descriptor.is_contiguous() {
            // SAFETY: contiguous descriptors address exactly `size` consecutive elements.
            unsafe { ptr::copy_nonoverlapping(base, handle.as_mut_ptr(), handle.size) };
            return Ok(handle);
        }

        let mut index = [0usize; N];
        for dst in handle.as_mut_slice() {
            let offset: isize = index
                .iter()
                .zip(descriptor.strides.iter())
                .map(|(&i, &stride)| i as isize * stride)
                .sum();
            // SAFETY: `index` stays within `sizes`, which the caller guarantees readable.
            *dst = unsafe { base.offset(offset).read() };
            for dim in (0..N).rev() {
                index[dim] += 1;
                if index[dim] < sizes[dim] {
                    break;
                }
                index[dim] = 0;
            }
        }
        Ok(handle)
    }

    /// Fallible deep copy; [`Clone`] aborts on allocation failure instead.
    pub fn try_clone(&self) -> Result<Self> {
        let mut copy = self.empty_like();
        if self.size > 0 {
            let mut data = bytemuck::allocation::try_zeroed_slice_box::<T>(self.size)
                .map_err(|_| ContainerError::Allocation { elements: self.size })?;
            data.copy_from_slice(self.as_slice());
            copy.adopt(data);
        }
        Ok(copy)
    }

    /// Move the contents out, leaving `self` empty.
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Reinterpret the same elements under new extents of any rank.
    ///
    /// Ownership moves into the returned handle. The element count must be
    /// unchanged.
    pub fn reshape<const M: usize>(self, sizes: [usize; M]) -> Result<BufferHandle<T, M>> {
        let (extents, size) = checked_extents(sizes)?;
        if size != self.size {
            return Err(ContainerError::ShapeMismatch {
                expected: self.size,
                actual: size,
            });
        }
        let strides = row_major_strides(&extents)?;
        let this = ManuallyDrop::new(self);
        Ok(BufferHandle {
            descriptor: MemRefDescriptor {
                allocated: this.descriptor.allocated,
                aligned: this.descriptor.aligned,
                offset: this.descriptor.offset,
                sizes: extents,
                strides,
            },
            size,
            storage: this.storage,
        })
    }

    pub fn fill(&mut self, value: T) {
        self.as_mut_slice().fill(value);
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of dimensions.
    #[inline]
    pub const fn rank(&self) -> usize {
        N
    }

    #[inline]
    pub fn sizes(&self) -> &[isize; N] {
        &self.descriptor.sizes
    }

    #[inline]
    pub fn strides(&self) -> &[isize; N] {
        &self.descriptor.strides
    }

    /// Extents as unsigned integers.
    pub fn shape(&self) -> [usize; N] {
        self.descriptor.sizes.map(|extent| extent as usize)
    }

    #[inline]
    pub fn storage(&self) -> Storage {
        self.storage
    }

    #[inline]
    pub fn is_owned(&self) -> bool {
        self.storage == Storage::Owned
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.descriptor.aligned
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.descriptor.aligned
    }

    /// The descriptor record handed to kernels.
    #[inline]
    pub fn descriptor(&self) -> &MemRefDescriptor<T, N> {
        &self.descriptor
    }

    /// Descriptor pointer for kernels that write through their arguments.
    ///
    /// Kernels must not change the pointers or extents; only the elements.
    #[inline]
    pub fn descriptor_mut_ptr(&mut self) -> *mut MemRefDescriptor<T, N> {
        &mut self.descriptor
    }

    pub fn as_slice(&self) -> &[T] {
        if self.size == 0 || self.descriptor.aligned.is_null() {
            return &[];
        }
        // SAFETY: owned storage holds `size` elements; borrowed storage is
        // valid for `size` elements by the `from_raw_parts` contract.
        unsafe { slice::from_raw_parts(self.descriptor.aligned, self.size) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        if self.size == 0 || self.descriptor.aligned.is_null() {
            return &mut [];
        }
        // SAFETY: see `as_slice`; `&mut self` guarantees exclusive access.
        unsafe { slice::from_raw_parts_mut(self.descriptor.aligned, self.size) }
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Element at a linear index without bounds checking.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len).
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        unsafe { &*self.descriptor.aligned.add(index) }
    }

    /// Mutable element at a linear index without bounds checking.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len).
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        unsafe { &mut *self.descriptor.aligned.add(index) }
    }

    /// Linear index of a coordinate through the strides.
    ///
    /// # Panics
    ///
    /// Panics when a coordinate is outside its dimension.
    pub fn linear_index(&self, index: [usize; N]) -> usize {
        let mut linear = 0usize;
        for (dim, &i) in index.iter().enumerate() {
            let extent = self.descriptor.sizes[dim] as usize;
            assert!(
                i < extent,
                "index {i} out of range for dimension {dim} with extent {extent}"
            );
            linear += i * self.descriptor.strides[dim] as usize;
        }
        linear
    }

    fn shaped(sizes: [usize; N]) -> Result<Self> {
        let (extents, size) = checked_extents(sizes)?;
        let strides = row_major_strides(&extents)?;
        Ok(Self {
            descriptor: MemRefDescriptor {
                sizes: extents,
                strides,
                ..MemRefDescriptor::empty()
            },
            size,
            storage: Storage::Empty,
        })
    }

    fn empty_like(&self) -> Self {
        Self {
            descriptor: MemRefDescriptor {
                sizes: self.descriptor.sizes,
                strides: self.descriptor.strides,
                ..MemRefDescriptor::empty()
            },
            size: self.size,
            storage: Storage::Empty,
        }
    }

    fn adopt(&mut self, data: Box<[T]>) {
        debug_assert_eq!(data.len(), self.size);
        debug_assert_eq!(self.storage, Storage::Empty);
        let allocated = Box::into_raw(data) as *mut T;
        self.descriptor.allocated = allocated;
        self.descriptor.aligned = allocated;
        self.descriptor.offset = 0;
        self.storage = Storage::Owned;
    }
}

impl<T: Pod, const N: usize> Default for BufferHandle<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Pod, const N: usize> Clone for BufferHandle<T, N> {
    fn clone(&self) -> Self {
        let mut copy = self.empty_like();
        if self.size > 0 {
            copy.adopt(Box::from(self.as_slice()));
        }
        debug!("Deep-copied buffer handle {:?}", self.descriptor.sizes);
        copy
    }

    fn clone_from(&mut self, source: &Self) {
        if self.is_owned() && self.size == source.size {
            self.as_mut_slice().copy_from_slice(source.as_slice());
            self.descriptor.sizes = source.descriptor.sizes;
            self.descriptor.strides = source.descriptor.strides;
        } else {
            *self = source.clone();
        }
    }
}

impl<T, const N: usize> Drop for BufferHandle<T, N> {
    fn drop(&mut self) {
        if self.storage == Storage::Owned {
            let data = ptr::slice_from_raw_parts_mut(self.descriptor.allocated, self.size);
            // SAFETY: `allocated` came from `Box::into_raw` on a slice of
            // `size` elements and no other handle owns it.
            drop(unsafe { Box::from_raw(data) });
        }
    }
}

impl<T: Pod + PartialEq, const N: usize> PartialEq for BufferHandle<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.sizes == other.descriptor.sizes && self.as_slice() == other.as_slice()
    }
}

impl<T, const N: usize> fmt::Debug for BufferHandle<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferHandle")
            .field("sizes", &self.descriptor.sizes)
            .field("strides", &self.descriptor.strides)
            .field("size", &self.size)
            .field("storage", &self.storage)
            .finish()
    }
}

impl<T: Pod, const N: usize> Index<usize> for BufferHandle<T, N> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T: Pod, const N: usize> IndexMut<usize> for BufferHandle<T, N> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

impl<T: Pod, const N: usize> Index<[usize; N]> for BufferHandle<T, N> {
    type Output = T;

    #[inline]
    fn index(&self, index: [usize; N]) -> &T {
        let linear = self.linear_index(index);
        &self.as_slice()[linear]
    }
}

impl<T: Pod, const N: usize> IndexMut<[usize; N]> for BufferHandle<T, N> {
    #[inline]
    fn index_mut(&mut self, index: [usize; N]) -> &mut T {
        let linear = self.linear_index(index);
        &mut self.as_mut_slice()[linear]
    }
}
