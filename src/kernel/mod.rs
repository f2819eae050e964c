pub mod ffi;
pub mod resize;

pub use ffi::{invoke_binary, invoke_unary, BinaryKernel, UnaryKernel};
pub use resize::{resize_2d, InterpolationType, ResizeTarget};
