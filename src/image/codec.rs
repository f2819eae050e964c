//! File loading and saving for image handles.
//!
//! Decoding and encoding are delegated to the `image` crate; this module only
//! maps decoded pixels into handles and back.
use crate::error::{ContainerError, Result};
use crate::image::container::{ChannelLayout, ImageHandle};
use crate::image::sample::PixelSample;
use log::debug;
use std::path::Path;

/// Pixel interpretation used when decoding a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// Convert to a single luma channel; loads into rank-2 handles
    #[default]
    Grayscale,
    /// Convert to three RGB channels; loads into rank-4 handles
    Color,
}

/// Options for [`imread_with`].
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    pub mode: ReadMode,
    /// Divide samples by 255 while loading
    pub normalize: bool,
    /// Channel layout for color loads
    pub layout: ChannelLayout,
}

/// Options for [`imwrite_with`].
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Multiply elements by 255 before encoding, undoing a normalised load
    pub denormalize: bool,
}

/// Decode `path` into an image handle with default options for `mode`.
pub fn imread<T: PixelSample, const N: usize, P: AsRef<Path>>(
    path: P,
    mode: ReadMode,
) -> Result<ImageHandle<T, N>> {
    imread_with(
        path,
        &ReadOptions {
            mode,
            ..ReadOptions::default()
        },
    )
}

/// Decode `path` into an image handle.
///
/// The rank must match the mode: 2 for grayscale, 4 for color.
pub fn imread_with<T: PixelSample, const N: usize, P: AsRef<Path>>(
    path: P,
    options: &ReadOptions,
) -> Result<ImageHandle<T, N>> {
    let path = path.as_ref();
    let decoded = image::open(path)?;
    debug!(
        "Decoded {} ({}x{}, {:?}) as {:?}",
        path.display(),
        decoded.width(),
        decoded.height(),
        decoded.color(),
        options.mode
    );

    match options.mode {
        ReadMode::Grayscale => {
            ImageHandle::from_matrix_with_layout(&decoded.into_luma8(), options.layout, options.normalize)
        }
        ReadMode::Color => {
            ImageHandle::from_matrix_with_layout(&decoded.into_rgb8(), options.layout, options.normalize)
        }
    }
}

/// Encode an image handle to `path`; the format follows the file extension.
pub fn imwrite<T: PixelSample, const N: usize, P: AsRef<Path>>(
    path: P,
    image: &ImageHandle<T, N>,
) -> Result<()> {
    imwrite_with(path, image, &WriteOptions::default())
}

/// Encode an image handle to `path` with explicit options.
pub fn imwrite_with<T: PixelSample, const N: usize, P: AsRef<Path>>(
    path: P,
    image: &ImageHandle<T, N>,
    options: &WriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    match image.channels() {
        1 => image.to_gray_image(options.denormalize)?.save(path)?,
        3 => image.to_rgb_image(options.denormalize)?.save(path)?,
        other => return Err(ContainerError::UnsupportedChannels(other)),
    }
    debug!(
        "Encoded {}x{} image with {} channel(s) to {}",
        image.width(),
        image.height(),
        image.channels(),
        path.display()
    );
    Ok(())
}
