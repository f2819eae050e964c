use crate::error::{ContainerError, Result};
use std::fmt;
use std::ptr;

/// Strided memref descriptor passed to compiled kernels.
///
/// Field order and widths follow the ranked memref calling convention:
/// `allocated, aligned, offset, sizes[N], strides[N]`, every field
/// pointer-sized. Kernels index element `(i0, .., iN-1)` at
/// `aligned + offset + sum(ik * strides[k])`.
#[repr(C)]
pub struct MemRefDescriptor<T, const N: usize> {
    /// Pointer returned by the allocator, null when the descriptor does not own its data
    pub allocated: *mut T,
    /// Pointer used for element access
    pub aligned: *mut T,
    /// Element offset from `aligned`
    pub offset: isize,
    pub sizes: [isize; N],
    pub strides: [isize; N],
}

impl<T, const N: usize> MemRefDescriptor<T, N> {
    /// Descriptor with null pointers and all extents zero.
    pub const fn empty() -> Self {
        Self {
            allocated: ptr::null_mut(),
            aligned: ptr::null_mut(),
            offset: 0,
            sizes: [0; N],
            strides: [0; N],
        }
    }

    /// Number of elements addressed, or `None` when an extent is negative
    /// or the product overflows.
    pub fn element_count(&self) -> Option<usize> {
        self.sizes.iter().try_fold(1usize, |acc, &extent| {
            let extent = usize::try_from(extent).ok()?;
            acc.checked_mul(extent)
        })
    }

    /// Whether the strides are the row-major strides of `sizes`.
    pub fn is_contiguous(&self) -> bool {
        row_major_strides(&self.sizes).is_ok_and(|strides| strides == self.strides)
    }
}

impl<T, const N: usize> Clone for MemRefDescriptor<T, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const N: usize> Copy for MemRefDescriptor<T, N> {}

impl<T, const N: usize> Default for MemRefDescriptor<T, N> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T, const N: usize> fmt::Debug for MemRefDescriptor<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemRefDescriptor")
            .field("allocated", &self.allocated)
            .field("aligned", &self.aligned)
            .field("offset", &self.offset)
            .field("sizes", &self.sizes)
            .field("strides", &self.strides)
            .finish()
    }
}

/// Row-major strides: the last dimension has stride 1 and every other
/// dimension steps over the product of the extents after it.
///
/// Kernels index through these strides, so the layout must not change.
pub fn row_major_strides<const N: usize>(sizes: &[isize; N]) -> Result<[isize; N]> {
    let mut strides = [0isize; N];
    if N == 0 {
        return Ok(strides);
    }
    strides[N - 1] = 1;
    for i in (0..N - 1).rev() {
        strides[i] = strides[i + 1]
            .checked_mul(sizes[i + 1])
            .ok_or_else(|| overflow(sizes))?;
    }
    Ok(strides)
}

/// Convert caller extents to descriptor extents and count the elements.
pub(crate) fn checked_extents<const N: usize>(sizes: [usize; N]) -> Result<([isize; N], usize)> {
    let mut extents = [0isize; N];
    let mut count = 1usize;
    for (extent, &size) in extents.iter_mut().zip(sizes.iter()) {
        *extent = isize::try_from(size).map_err(|_| ContainerError::ShapeOverflow {
            sizes: sizes.to_vec(),
        })?;
        count = count.checked_mul(size).ok_or_else(|| ContainerError::ShapeOverflow {
            sizes: sizes.to_vec(),
        })?;
    }
    // The element count is stored in pointer-sized signed fields by kernels.
    if isize::try_from(count).is_err() {
        return Err(ContainerError::ShapeOverflow {
            sizes: sizes.to_vec(),
        });
    }
    Ok((extents, count))
}

fn overflow<const N: usize>(sizes: &[isize; N]) -> ContainerError {
    ContainerError::ShapeOverflow {
        sizes: sizes.iter().map(|&s| s.max(0) as usize).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_row_major_strides() {
        assert_eq!(row_major_strides(&[4, 4]).unwrap(), [4, 1]);
        assert_eq!(row_major_strides(&[2, 3, 5]).unwrap(), [15, 5, 1]);
        assert_eq!(row_major_strides(&[1, 224, 224, 3]).unwrap(), [150528, 672, 3, 1]);
        assert_eq!(row_major_strides::<0>(&[]).unwrap(), []);
    }

    #[test]
    fn test_strides_recurrence_holds() {
        let shapes: [[isize; 4]; 4] = [[1, 2, 3, 4], [7, 1, 1, 9], [0, 5, 2, 3], [3, 0, 8, 1]];
        for sizes in shapes {
            let strides = row_major_strides(&sizes).unwrap();
            assert_eq!(strides[3], 1);
            for i in 0..3 {
                assert_eq!(strides[i], strides[i + 1] * sizes[i + 1]);
            }
        }
    }

    #[test]
    fn test_stride_overflow_is_reported() {
        let result = row_major_strides(&[0, isize::MAX, isize::MAX]);
        assert!(matches!(result, Err(ContainerError::ShapeOverflow { .. })));
    }

    #[test]
    fn test_checked_extents() {
        let (extents, count) = checked_extents([3, 4, 5]).unwrap();
        assert_eq!(extents, [3, 4, 5]);
        assert_eq!(count, 60);

        assert!(checked_extents([usize::MAX, 2]).is_err());
    }

    #[test]
    fn test_descriptor_layout_matches_calling_convention() {
        let word = size_of::<usize>();
        assert_eq!(offset_of!(MemRefDescriptor<f32, 2>, allocated), 0);
        assert_eq!(offset_of!(MemRefDescriptor<f32, 2>, aligned), word);
        assert_eq!(offset_of!(MemRefDescriptor<f32, 2>, offset), 2 * word);
        assert_eq!(offset_of!(MemRefDescriptor<f32, 2>, sizes), 3 * word);
        assert_eq!(offset_of!(MemRefDescriptor<f32, 2>, strides), 5 * word);
        assert_eq!(size_of::<MemRefDescriptor<f32, 2>>(), 7 * word);
        assert_eq!(size_of::<MemRefDescriptor<u8, 4>>(), 11 * word);
    }

    #[test]
    fn test_element_count_and_contiguity() {
        let mut desc = MemRefDescriptor::<f32, 3>::empty();
        desc.sizes = [2, 3, 4];
        desc.strides = [12, 4, 1];
        assert_eq!(desc.element_count(), Some(24));
        assert!(desc.is_contiguous());

        desc.strides = [1, 2, 6];
        assert!(!desc.is_contiguous());

        desc.sizes[0] = -1;
        assert_eq!(desc.element_count(), None);
    }
}
