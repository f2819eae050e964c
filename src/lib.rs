//! Memref Container Library
//!
//! Strided, row-major buffer handles for exchanging array and image data with
//! independently compiled numerical kernels.
//!
//! ## Layers
//!
//! 1. **Buffer descriptor** (`memref`)
//!    - [`MemRefDescriptor`] is the `repr(C)` record kernels receive:
//!      `allocated, aligned, offset, sizes[N], strides[N]`
//!    - [`BufferHandle`] wraps it with ownership: owned storage is freed exactly
//!      once, borrowed storage never; clones are deep copies
//!    - [`BufferView`] is a borrow-checked non-owning handle over a slice
//!
//! 2. **Image adapter** (`image`)
//!    - [`ImageHandle`] composes a `BufferHandle` with channel semantics: rank 2
//!      is grayscale, rank 4 is three-channel color with a batch dimension
//!    - [`ImageMatrix`] is the narrow interface over decoded images
//!    - [`imread`] / [`imwrite`] delegate file formats to the `image` crate
//!
//! 3. **Kernel boundary** (`kernel`)
//!    - [`invoke_unary`] / [`invoke_binary`] pass descriptor pointers to
//!      `extern "C"` kernels
//!    - [`resize_2d`] delegates interpolation to `image::imageops`
//!
//! ## Strides
//!
//! Strides are always row-major: `strides[N-1] = 1` and
//! `strides[i] = strides[i+1] * sizes[i+1]`. Kernels index through them, so the
//! layout is fixed.

pub mod error;
pub mod image;
pub mod kernel;
pub mod memref;

pub use error::{ContainerError, Result};
pub use crate::image::{
    imread, imread_with, imwrite, imwrite_with, ChannelLayout, ImageHandle, ImageMatrix, PixelSample, ReadMode,
    ReadOptions, WriteOptions,
};
pub use kernel::{invoke_binary, invoke_unary, resize_2d, InterpolationType, ResizeTarget};
pub use memref::{BufferHandle, BufferView, MemRefDescriptor, Storage};
