use crate::error::{ContainerError, Result};
use crate::image::matrix::ImageMatrix;
use crate::image::sample::PixelSample;
use crate::memref::{BufferHandle, MemRefDescriptor};
use image::{GrayImage, Luma, Rgb, RgbImage};
use log::{debug, error};
use std::ops::{Deref, Index, IndexMut};

/// Position of the channel dimension in a batched image handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelLayout {
    /// `[batch, height, width, channels]`
    #[default]
    Nhwc,
    /// `[batch, channels, height, width]`
    Nchw,
}

impl ChannelLayout {
    /// Axes of `(height, width, channels)` for a handle of `rank`.
    /// Handles below rank 3 have no channel axis.
    pub fn axes(self, rank: usize) -> (usize, usize, Option<usize>) {
        match (rank, self) {
            (0..=2, _) => (0, rank.saturating_sub(1), None),
            (_, ChannelLayout::Nhwc) => (rank - 3, rank - 2, Some(rank - 1)),
            (_, ChannelLayout::Nchw) => (rank - 2, rank - 1, Some(rank - 3)),
        }
    }

    fn color_sizes<const N: usize>(self, rows: usize, cols: usize, channels: usize) -> [usize; N] {
        let mut sizes = [1usize; N];
        let (h, w, c) = self.axes(N);
        sizes[h] = rows;
        sizes[w] = cols;
        if let Some(c) = c {
            sizes[c] = channels;
        }
        sizes
    }
}

/// Image container over a [`BufferHandle`].
///
/// Rank 2 holds a single-channel `[height, width]` image; rank 4 holds a
/// three-channel image with a leading batch dimension in the given
/// [`ChannelLayout`]. The handle is the first field, so a pointer to an
/// `ImageHandle` is also a valid memref descriptor pointer.
#[repr(C)]
#[derive(Clone, Debug, PartialEq)]
pub struct ImageHandle<T: PixelSample, const N: usize> {
    buffer: BufferHandle<T, N>,
    layout: ChannelLayout,
}

impl<T: PixelSample, const N: usize> ImageHandle<T, N> {
    pub fn new() -> Self {
        Self {
            buffer: BufferHandle::new(),
            layout: ChannelLayout::default(),
        }
    }

    /// Zero-initialised image with explicit extents in the default layout.
    ///
    /// # Panics
    ///
    /// Same rank and channel checks as [`ImageHandle::from_buffer`].
    pub fn with_sizes(sizes: [usize; N]) -> Result<Self> {
        Ok(Self::from_buffer(
            BufferHandle::with_sizes(sizes)?,
            ChannelLayout::default(),
        ))
    }

    /// Wrap kernel output as an image.
    ///
    /// # Panics
    ///
    /// Panics unless the rank is 2, or the rank is 4 with a three-channel
    /// dimension in `layout`.
    pub fn from_buffer(buffer: BufferHandle<T, N>, layout: ChannelLayout) -> Self {
        let image = Self { buffer, layout };
        match N {
            2 => {}
            4 => assert!(
                image.channels() == 3 || image.buffer.is_empty(),
                "Rank 4 images must have 3 channels, got {}",
                image.channels()
            ),
            _ => panic!("Image handles must have rank 2 (gray) or 4 (RGB), got {}", N),
        }
        image
    }

    /// Load an image matrix in the default [`ChannelLayout::Nhwc`] layout.
    ///
    /// With `norm`, samples are divided by 255.
    pub fn from_matrix<M: ImageMatrix + ?Sized>(image: &M, norm: bool) -> Result<Self> {
        Self::from_matrix_with_layout(image, ChannelLayout::default(), norm)
    }

    /// Load an image matrix.
    ///
    /// One-channel images need `N == 2` and three-channel images `N == 4`;
    /// anything else with those channel counts is a programming error and
    /// panics. Other channel counts are reported and rejected.
    pub fn from_matrix_with_layout<M: ImageMatrix + ?Sized>(
        image: &M,
        layout: ChannelLayout,
        norm: bool,
    ) -> Result<Self> {
        let channels = image.num_channels();
        match channels {
            1 => assert!(N == 2, "For gray images, the number of dimensions must be 2, got {}", N),
            3 => assert!(
                N == 4,
                "For RGB images, the number of dimensions must be 4, either in NHWC or NCHW layout, got {}",
                N
            ),
            other => {
                error!(
                    "Only 1-channel gray images and 3-channel RGB images are supported, but got images' channel equal to {other}"
                );
                return Err(ContainerError::UnsupportedChannels(other));
            }
        }

        let (rows, cols) = (image.num_rows(), image.num_cols());
        let convert: fn(u8) -> T = if norm { T::normalized_sample } else { T::from_sample };

        let sizes = if channels == 1 {
            let mut sizes = [0usize; N];
            sizes.copy_from_slice(&[rows, cols]);
            sizes
        } else {
            layout.color_sizes::<N>(rows, cols, channels)
        };
        let mut buffer = BufferHandle::<T, N>::with_sizes(sizes)?;
        let data = buffer.as_mut_slice();

        match (channels, layout) {
            (1, _) | (_, ChannelLayout::Nhwc) => {
                let mut k = 0;
                for row in 0..rows {
                    for col in 0..cols {
                        for channel in 0..channels {
                            data[k] = convert(image.sample(row, col, channel));
                            k += 1;
                        }
                    }
                }
            }
            (_, ChannelLayout::Nchw) => {
                let plane = rows * cols;
                for channel in 0..channels {
                    for row in 0..rows {
                        for col in 0..cols {
                            data[channel * plane + row * cols + col] =
                                convert(image.sample(row, col, channel));
                        }
                    }
                }
            }
        }

        debug!(
            "Loaded {}x{} image with {} channel(s) into rank-{} handle {:?}",
            cols, rows, channels, N, sizes
        );
        Ok(Self { buffer, layout })
    }

    /// 1 for rank-2 images, otherwise the extent of the channel dimension.
    pub fn channels(&self) -> usize {
        match self.layout.axes(N) {
            (_, _, None) => 1,
            (_, _, Some(axis)) => self.buffer.sizes()[axis] as usize,
        }
    }

    pub fn height(&self) -> usize {
        let (h, _, _) = self.layout.axes(N);
        self.buffer.sizes()[h] as usize
    }

    pub fn width(&self) -> usize {
        let (_, w, _) = self.layout.axes(N);
        self.buffer.sizes()[w] as usize
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn as_buffer(&self) -> &BufferHandle<T, N> {
        &self.buffer
    }

    pub fn into_buffer(self) -> BufferHandle<T, N> {
        self.buffer
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.buffer.as_mut_slice()
    }

    /// Descriptor pointer for kernels writing into this image.
    pub fn descriptor_mut_ptr(&mut self) -> *mut MemRefDescriptor<T, N> {
        self.buffer.descriptor_mut_ptr()
    }

    /// Move the contents out, leaving an empty image behind.
    pub fn take(&mut self) -> Self {
        Self {
            buffer: self.buffer.take(),
            layout: self.layout,
        }
    }

    /// Sample at `(row, col, channel)` of the first batch entry.
    pub fn pixel(&self, row: usize, col: usize, channel: usize) -> T {
        let (h, w, c) = self.layout.axes(N);
        let mut index = [0usize; N];
        index[h] = row;
        index[w] = col;
        if let Some(c) = c {
            index[c] = channel;
        }
        self.buffer[index]
    }

    /// Single-channel image as an 8-bit gray image.
    pub fn to_gray_image(&self, denormalize: bool) -> Result<GrayImage> {
        if self.channels() != 1 {
            return Err(ContainerError::UnsupportedChannels(self.channels()));
        }
        let (width, height) = self.extent_u32()?;
        Ok(GrayImage::from_fn(width, height, |x, y| {
            Luma([self.pixel(y as usize, x as usize, 0).to_sample(denormalize)])
        }))
    }

    /// Three-channel image as an 8-bit RGB image.
    pub fn to_rgb_image(&self, denormalize: bool) -> Result<RgbImage> {
        if self.channels() != 3 {
            return Err(ContainerError::UnsupportedChannels(self.channels()));
        }
        let (width, height) = self.extent_u32()?;
        Ok(RgbImage::from_fn(width, height, |x, y| {
            let (row, col) = (y as usize, x as usize);
            Rgb([0, 1, 2].map(|channel| self.pixel(row, col, channel).to_sample(denormalize)))
        }))
    }

    fn extent_u32(&self) -> Result<(u32, u32)> {
        let width = u32::try_from(self.width())
            .map_err(|_| ContainerError::Other(format!("image width {} exceeds u32", self.width())))?;
        let height = u32::try_from(self.height())
            .map_err(|_| ContainerError::Other(format!("image height {} exceeds u32", self.height())))?;
        Ok((width, height))
    }
}

impl<T: PixelSample, const N: usize> Default for ImageHandle<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PixelSample, const N: usize> Deref for ImageHandle<T, N> {
    type Target = BufferHandle<T, N>;

    fn deref(&self) -> &BufferHandle<T, N> {
        &self.buffer
    }
}

impl<T: PixelSample, const N: usize> AsRef<MemRefDescriptor<T, N>> for ImageHandle<T, N> {
    fn as_ref(&self) -> &MemRefDescriptor<T, N> {
        self.buffer.descriptor()
    }
}

impl<T: PixelSample, const N: usize> Index<usize> for ImageHandle<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.buffer[index]
    }
}

impl<T: PixelSample, const N: usize> IndexMut<usize> for ImageHandle<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.buffer[index]
    }
}

impl<T: PixelSample, const N: usize> Index<[usize; N]> for ImageHandle<T, N> {
    type Output = T;

    fn index(&self, index: [usize; N]) -> &T {
        &self.buffer[index]
    }
}

impl<T: PixelSample, const N: usize> IndexMut<[usize; N]> for ImageHandle<T, N> {
    fn index_mut(&mut self, index: [usize; N]) -> &mut T {
        &mut self.buffer[index]
    }
}
