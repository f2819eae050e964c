mod common;

use common::{gray_reference, init_logging, rgb_with_rect, scratch_path, GRAY_PIXELS};
use imageproc::rect::Rect;
use memref_container::{
    imread, imread_with, imwrite, imwrite_with, ChannelLayout, ContainerError, ImageHandle, ReadMode, ReadOptions,
    WriteOptions,
};

#[test]
fn test_grayscale_png_round_trip() {
    init_logging();
    let path = scratch_path("gray.png");
    gray_reference().save(&path).unwrap();

    let loaded: ImageHandle<f32, 2> = imread(&path, ReadMode::Grayscale).unwrap();
    assert_eq!(loaded.sizes(), &[4, 4]);
    assert_eq!(loaded.strides(), &[4, 1]);
    assert_eq!(loaded[0], 15.0);
    assert_eq!(loaded[3], 60.0);

    let out = scratch_path("gray_out.png");
    imwrite(&out, &loaded).unwrap();
    let reloaded: ImageHandle<u8, 2> = imread(&out, ReadMode::Grayscale).unwrap();
    assert_eq!(reloaded.as_slice(), &GRAY_PIXELS);
}

#[test]
fn test_normalized_load_and_denormalized_write() {
    init_logging();
    let path = scratch_path("gray_norm.png");
    gray_reference().save(&path).unwrap();

    let options = ReadOptions {
        normalize: true,
        ..ReadOptions::default()
    };
    let loaded: ImageHandle<f64, 2> = imread_with(&path, &options).unwrap();
    assert!((loaded[15] - 240.0 / 255.0).abs() < 1e-12);
    assert!(loaded.iter().all(|&v| (0.0..=1.0).contains(&v)));

    let out = scratch_path("gray_norm_out.png");
    imwrite_with(&out, &loaded, &WriteOptions { denormalize: true }).unwrap();
    let decoded = image::open(&out).unwrap().into_luma8();
    assert_eq!(decoded, gray_reference());
}

#[test]
fn test_color_png_round_trip_both_layouts() {
    init_logging();
    let rgb = rgb_with_rect(5, 3, Rect::at(1, 0).of_size(2, 2), [200, 100, 50]);
    let path = scratch_path("color.png");
    rgb.save(&path).unwrap();

    let nhwc: ImageHandle<f32, 4> = imread(&path, ReadMode::Color).unwrap();
    assert_eq!(nhwc.sizes(), &[1, 3, 5, 3]);
    assert_eq!(nhwc.pixel(1, 2, 0), 200.0);
    assert_eq!(nhwc.pixel(2, 2, 0), 0.0);

    let options = ReadOptions {
        mode: ReadMode::Color,
        layout: ChannelLayout::Nchw,
        ..ReadOptions::default()
    };
    let nchw: ImageHandle<f32, 4> = imread_with(&path, &options).unwrap();
    assert_eq!(nchw.sizes(), &[1, 3, 3, 5]);
    assert_eq!(nchw.pixel(0, 1, 2), 50.0);

    for (name, image) in [("nhwc_out.png", &nhwc), ("nchw_out.png", &nchw)] {
        let out = scratch_path(name);
        imwrite(&out, image).unwrap();
        assert_eq!(image::open(&out).unwrap().into_rgb8(), rgb);
    }
}

#[test]
fn test_color_file_read_as_grayscale() {
    let rgb = rgb_with_rect(4, 4, Rect::at(0, 0).of_size(4, 4), [255, 255, 255]);
    let path = scratch_path("white.png");
    rgb.save(&path).unwrap();

    let gray: ImageHandle<u8, 2> = imread(&path, ReadMode::Grayscale).unwrap();
    assert_eq!(gray.channels(), 1);
    assert!(gray.iter().all(|&v| v == 255));
}

#[test]
fn test_missing_file_is_an_error() {
    init_logging();
    let result: Result<ImageHandle<f32, 2>, _> = imread(scratch_path("does_not_exist.png"), ReadMode::Grayscale);
    assert!(matches!(
        result,
        Err(ContainerError::ImageError(_)) | Err(ContainerError::IoError(_))
    ));
}
