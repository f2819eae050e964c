//! Calling compiled kernels with memref descriptors.
//!
//! Kernels built by a memref-lowering toolchain take descriptor pointers
//! (the C-interface wrappers). Output descriptors are passed first.
use crate::memref::{BufferHandle, MemRefDescriptor};
use bytemuck::Pod;
use log::debug;

/// Kernel writing into a preallocated output: `kernel(output, input)`.
pub type UnaryKernel<T, const N: usize> =
    unsafe extern "C" fn(*mut MemRefDescriptor<T, N>, *mut MemRefDescriptor<T, N>);

/// Kernel combining two inputs into a preallocated output: `kernel(output, lhs, rhs)`.
pub type BinaryKernel<T, const N: usize> = unsafe extern "C" fn(
    *mut MemRefDescriptor<T, N>,
    *mut MemRefDescriptor<T, N>,
    *mut MemRefDescriptor<T, N>,
);

/// Run a unary kernel.
///
/// # Safety
///
/// `kernel` must only access elements within the extents of each descriptor
/// and must not change any descriptor field.
pub unsafe fn invoke_unary<T: Pod, const N: usize>(
    kernel: UnaryKernel<T, N>,
    output: &mut BufferHandle<T, N>,
    input: &mut BufferHandle<T, N>,
) {
    debug!(
        "Invoking unary kernel: {:?} -> {:?}",
        input.sizes(),
        output.sizes()
    );
    // SAFETY: both descriptors describe live storage; the caller vouches for the kernel.
    unsafe { kernel(output.descriptor_mut_ptr(), input.descriptor_mut_ptr()) };
}

/// Run a binary kernel.
///
/// # Safety
///
/// Same contract as [`invoke_unary`].
pub unsafe fn invoke_binary<T: Pod, const N: usize>(
    kernel: BinaryKernel<T, N>,
    output: &mut BufferHandle<T, N>,
    lhs: &mut BufferHandle<T, N>,
    rhs: &mut BufferHandle<T, N>,
) {
    debug!(
        "Invoking binary kernel: {:?}, {:?} -> {:?}",
        lhs.sizes(),
        rhs.sizes(),
        output.sizes()
    );
    // SAFETY: see `invoke_unary`.
    unsafe {
        kernel(
            output.descriptor_mut_ptr(),
            lhs.descriptor_mut_ptr(),
            rhs.descriptor_mut_ptr(),
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "C" fn double(output: *mut MemRefDescriptor<f32, 2>, input: *mut MemRefDescriptor<f32, 2>) {
        let (output, input) = unsafe { (&*output, &*input) };
        for i in 0..input.sizes[0] {
            for j in 0..input.sizes[1] {
                let src = input.offset + i * input.strides[0] + j * input.strides[1];
                let dst = output.offset + i * output.strides[0] + j * output.strides[1];
                unsafe { *output.aligned.offset(dst) = 2.0 * *input.aligned.offset(src) };
            }
        }
    }

    unsafe extern "C" fn add(
        output: *mut MemRefDescriptor<i32, 1>,
        lhs: *mut MemRefDescriptor<i32, 1>,
        rhs: *mut MemRefDescriptor<i32, 1>,
    ) {
        let (output, lhs, rhs) = unsafe { (&*output, &*lhs, &*rhs) };
        for i in 0..output.sizes[0] {
            unsafe { *output.aligned.offset(i) = *lhs.aligned.offset(i) + *rhs.aligned.offset(i) };
        }
    }

    #[test]
    fn test_invoke_unary() {
        let mut input = BufferHandle::<f32, 2>::from_vec([2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut output = BufferHandle::<f32, 2>::with_sizes([2, 2]).unwrap();
        unsafe { invoke_unary(double, &mut output, &mut input) };
        assert_eq!(output.as_slice(), &[2.0, 4.0, 6.0, 8.0]);
        assert_eq!(input.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_invoke_binary() {
        let mut lhs = BufferHandle::<i32, 1>::from_vec([3], vec![1, 2, 3]).unwrap();
        let mut rhs = BufferHandle::<i32, 1>::from_vec([3], vec![10, 20, 30]).unwrap();
        let mut output = BufferHandle::<i32, 1>::with_sizes([3]).unwrap();
        unsafe { invoke_binary(add, &mut output, &mut lhs, &mut rhs) };
        assert_eq!(output.as_slice(), &[11, 22, 33]);
    }
}
