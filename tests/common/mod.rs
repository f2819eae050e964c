//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use std::path::PathBuf;

/// Pixel values of the 4x4 grayscale reference image.
pub const GRAY_PIXELS: [u8; 16] = [
    15, 30, 45, 60, //
    75, 90, 105, 120, //
    135, 150, 165, 180, //
    195, 210, 225, 240,
];

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn gray_reference() -> GrayImage {
    GrayImage::from_raw(4, 4, GRAY_PIXELS.to_vec()).expect("16 samples fill a 4x4 image")
}

/// Black canvas with a filled colored rectangle.
pub fn rgb_with_rect(width: u32, height: u32, rect: Rect, color: [u8; 3]) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));
    draw_filled_rect_mut(&mut canvas, rect, Rgb(color));
    canvas
}

/// Gray canvas with a filled white rectangle.
pub fn gray_with_rect(width: u32, height: u32, rect: Rect) -> GrayImage {
    let mut canvas = GrayImage::from_pixel(width, height, Luma([32]));
    draw_filled_rect_mut(&mut canvas, rect, Luma([255]));
    canvas
}

/// Unique scratch path under the system temp directory.
pub fn scratch_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("memref_container_tests_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create scratch directory");
    dir.join(name)
}
