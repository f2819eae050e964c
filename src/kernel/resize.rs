//! Two-dimensional resize collaborator.
//!
//! Interpolation is performed by `image::imageops::resize`; this module only
//! converts between buffer handles and the `image` crate's buffers.
use crate::error::{ContainerError, Result};
use crate::memref::BufferHandle;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationType {
    #[default]
    NearestNeighbour,
    /// Triangle filter. When downscaling, `image` widens its support to the
    /// scale factor, so the result is area-weighted rather than 4-tap bilinear.
    Bilinear,
}

impl InterpolationType {
    fn filter(self) -> FilterType {
        match self {
            InterpolationType::NearestNeighbour => FilterType::Nearest,
            InterpolationType::Bilinear => FilterType::Triangle,
        }
    }
}

/// Output extent of a resize, either explicit or relative to the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeTarget {
    /// Output width (columns) and height (rows)
    Dimensions { width: usize, height: usize },
    /// Horizontal and vertical scaling ratios; extents are rounded
    Ratios { horizontal: f32, vertical: f32 },
}

impl ResizeTarget {
    /// Output `(width, height)` for an input of the given extents.
    pub fn output_extent(self, width: usize, height: usize) -> Result<(usize, usize)> {
        let (out_width, out_height) = match self {
            ResizeTarget::Dimensions { width, height } => (width, height),
            ResizeTarget::Ratios { horizontal, vertical } => {
                if !(horizontal.is_finite() && horizontal > 0.0 && vertical.is_finite() && vertical > 0.0) {
                    return Err(ContainerError::InvalidResizeTarget(format!(
                        "scaling ratios must be positive, got {horizontal} x {vertical}"
                    )));
                }
                (
                    (width as f64 * horizontal as f64).round() as usize,
                    (height as f64 * vertical as f64).round() as usize,
                )
            }
        };
        if out_width == 0 || out_height == 0 {
            return Err(ContainerError::InvalidResizeTarget(format!(
                "output dimensions must be positive, got {out_width} x {out_height}"
            )));
        }
        Ok((out_width, out_height))
    }
}

/// Resize a `[rows, cols]` handle.
pub fn resize_2d(
    input: &BufferHandle<f32, 2>,
    interpolation: InterpolationType,
    target: ResizeTarget,
) -> Result<BufferHandle<f32, 2>> {
    let [rows, cols] = input.shape();
    if input.is_empty() {
        return Err(ContainerError::InvalidResizeTarget(format!(
            "cannot resize an empty {rows}x{cols} handle"
        )));
    }
    let (out_width, out_height) = target.output_extent(cols, rows)?;

    // The image crate clamps float samples to [0, 1]; both filters are affine
    // combinations, so resampling in that range and mapping back is exact.
    let (low, high) = input
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = if high > low { high - low } else { 1.0 };
    let unit: Vec<f32> = input.iter().map(|&v| (v - low) / range).collect();

    let source: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_raw(to_u32(cols)?, to_u32(rows)?, unit).ok_or_else(|| {
            ContainerError::Other(format!("{rows}x{cols} handle does not fill an image buffer"))
        })?;
    let resized = imageops::resize(&source, to_u32(out_width)?, to_u32(out_height)?, interpolation.filter());
    let data = resized.into_raw().into_iter().map(|v| v * range + low).collect();

    debug!(
        "Resized {}x{} -> {}x{} with {:?}",
        cols, rows, out_width, out_height, interpolation
    );
    BufferHandle::from_vec([out_height, out_width], data)
}

fn to_u32(extent: usize) -> Result<u32> {
    u32::try_from(extent)
        .map_err(|_| ContainerError::InvalidResizeTarget(format!("extent {extent} exceeds u32")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_extent() {
        let dims = ResizeTarget::Dimensions { width: 224, height: 100 };
        assert_eq!(dims.output_extent(4, 4).unwrap(), (224, 100));

        let ratios = ResizeTarget::Ratios { horizontal: 0.5, vertical: 2.0 };
        assert_eq!(ratios.output_extent(5, 3).unwrap(), (3, 6));

        let negative = ResizeTarget::Ratios { horizontal: -1.0, vertical: 1.0 };
        assert!(negative.output_extent(4, 4).is_err());

        let zero = ResizeTarget::Dimensions { width: 0, height: 4 };
        assert!(zero.output_extent(4, 4).is_err());
    }

    #[test]
    fn test_resize_uniform_image() {
        let mut input = BufferHandle::<f32, 2>::with_sizes([3, 5]).unwrap();
        input.fill(7.0);

        for interpolation in [InterpolationType::NearestNeighbour, InterpolationType::Bilinear] {
            let output = resize_2d(
                &input,
                interpolation,
                ResizeTarget::Dimensions { width: 10, height: 6 },
            )
            .unwrap();
            assert_eq!(output.sizes(), &[6, 10]);
            assert_eq!(output.strides(), &[10, 1]);
            assert!(output.is_owned());
            assert!(output.iter().all(|&v| (v - 7.0).abs() < 1e-4));
        }
    }

    #[test]
    fn test_resize_by_ratio() {
        let input = BufferHandle::<f32, 2>::from_vec([2, 4], (0..8).map(|v| v as f32).collect()).unwrap();
        let output = resize_2d(
            &input,
            InterpolationType::NearestNeighbour,
            ResizeTarget::Ratios { horizontal: 0.5, vertical: 1.0 },
        )
        .unwrap();
        assert_eq!(output.sizes(), &[2, 2]);
    }

    #[test]
    fn test_nearest_keeps_input_values() {
        let input = BufferHandle::<f32, 2>::from_vec([2, 2], vec![15.0, 60.0, 195.0, 240.0]).unwrap();
        let output = resize_2d(
            &input,
            InterpolationType::NearestNeighbour,
            ResizeTarget::Dimensions { width: 4, height: 4 },
        )
        .unwrap();
        assert_eq!(output.len(), 16);
        for &v in output.iter() {
            assert!(input.iter().any(|&s| (s - v).abs() < 1e-3), "unexpected sample {v}");
        }
    }

    #[test]
    fn test_bilinear_stays_within_input_range() {
        let input = BufferHandle::<f32, 2>::from_vec([2, 3], vec![0.0, 50.0, 100.0, 150.0, 200.0, 250.0]).unwrap();
        let output = resize_2d(
            &input,
            InterpolationType::Bilinear,
            ResizeTarget::Ratios { horizontal: 2.0, vertical: 2.0 },
        )
        .unwrap();
        assert_eq!(output.sizes(), &[4, 6]);
        assert!(output.iter().all(|&v| (-1e-3..=250.001).contains(&v)));
        assert!(output.iter().any(|&v| v > 1.0));
    }

    #[test]
    fn test_resize_empty_input_rejected() {
        let input = BufferHandle::<f32, 2>::new();
        let result = resize_2d(
            &input,
            InterpolationType::Bilinear,
            ResizeTarget::Dimensions { width: 2, height: 2 },
        );
        assert!(matches!(result, Err(ContainerError::InvalidResizeTarget(_))));
    }
}
