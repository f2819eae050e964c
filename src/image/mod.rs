pub mod codec;
pub mod container;
pub mod matrix;
pub mod sample;

pub use codec::{imread, imread_with, imwrite, imwrite_with, ReadMode, ReadOptions, WriteOptions};
pub use container::{ChannelLayout, ImageHandle};
pub use matrix::ImageMatrix;
pub use sample::{PixelSample, MAX_SAMPLE};
