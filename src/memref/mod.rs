pub mod buffer;
pub mod descriptor;
pub mod view;

pub use buffer::{BufferHandle, Storage};
pub use descriptor::{row_major_strides, MemRefDescriptor};
pub use view::BufferView;
