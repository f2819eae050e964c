//! Narrow view of an external image matrix.
//!
//! [`ImageHandle`](super::ImageHandle) only needs the channel count, the
//! extents and per-sample reads, so that is all this trait exposes.
use image::{DynamicImage, GenericImageView, GrayImage, RgbImage, RgbaImage};

pub trait ImageMatrix {
    fn num_channels(&self) -> usize;
    fn num_rows(&self) -> usize;
    fn num_cols(&self) -> usize;

    /// Sample at `(row, col)` in `channel`. Callers stay within bounds.
    fn sample(&self, row: usize, col: usize, channel: usize) -> u8;
}

impl ImageMatrix for GrayImage {
    fn num_channels(&self) -> usize {
        1
    }
    fn num_rows(&self) -> usize {
        self.height() as usize
    }
    fn num_cols(&self) -> usize {
        self.width() as usize
    }
    #[inline]
    fn sample(&self, row: usize, col: usize, _channel: usize) -> u8 {
        self.get_pixel(col as u32, row as u32)[0]
    }
}

impl ImageMatrix for RgbImage {
    fn num_channels(&self) -> usize {
        3
    }
    fn num_rows(&self) -> usize {
        self.height() as usize
    }
    fn num_cols(&self) -> usize {
        self.width() as usize
    }
    #[inline]
    fn sample(&self, row: usize, col: usize, channel: usize) -> u8 {
        self.get_pixel(col as u32, row as u32)[channel]
    }
}

impl ImageMatrix for RgbaImage {
    fn num_channels(&self) -> usize {
        4
    }
    fn num_rows(&self) -> usize {
        self.height() as usize
    }
    fn num_cols(&self) -> usize {
        self.width() as usize
    }
    #[inline]
    fn sample(&self, row: usize, col: usize, channel: usize) -> u8 {
        self.get_pixel(col as u32, row as u32)[channel]
    }
}

impl ImageMatrix for DynamicImage {
    fn num_channels(&self) -> usize {
        self.color().channel_count() as usize
    }
    fn num_rows(&self) -> usize {
        self.height() as usize
    }
    fn num_cols(&self) -> usize {
        self.width() as usize
    }
    fn sample(&self, row: usize, col: usize, channel: usize) -> u8 {
        let (x, y) = (col as u32, row as u32);
        match self {
            DynamicImage::ImageLuma8(img) => img.get_pixel(x, y)[0],
            DynamicImage::ImageLumaA8(img) => img.get_pixel(x, y)[channel],
            DynamicImage::ImageRgb8(img) => img.get_pixel(x, y)[channel],
            DynamicImage::ImageRgba8(img) => img.get_pixel(x, y)[channel],
            other => {
                // Wider sample types go through the 8-bit RGBA view.
                let rgba = GenericImageView::get_pixel(other, x, y);
                match other.color().channel_count() {
                    1 => rgba[0],
                    2 => [rgba[0], rgba[3]][channel],
                    _ => rgba[channel],
                }
            }
        }
    }
}
