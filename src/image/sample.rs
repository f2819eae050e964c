//! Conversion between 8-bit image samples and buffer elements.
use bytemuck::Pod;

/// Largest 8-bit sample value; normalisation divides by it.
pub const MAX_SAMPLE: u8 = u8::MAX;

/// Element types an image handle can be built from and written back out of.
pub trait PixelSample: Pod + PartialEq + std::fmt::Debug {
    /// Sample value as-is.
    fn from_sample(sample: u8) -> Self;

    /// Sample divided by [`MAX_SAMPLE`]. Integer element types truncate.
    fn normalized_sample(sample: u8) -> Self;

    /// Back to an 8-bit sample, rounded and clamped to `0..=255`.
    /// `denormalize` multiplies by [`MAX_SAMPLE`] first.
    fn to_sample(self, denormalize: bool) -> u8;
}

macro_rules! impl_float_sample {
    ($($ty:ty),*) => {$(
        impl PixelSample for $ty {
            #[inline]
            fn from_sample(sample: u8) -> Self {
                sample as $ty
            }

            #[inline]
            fn normalized_sample(sample: u8) -> Self {
                sample as $ty / MAX_SAMPLE as $ty
            }

            #[inline]
            fn to_sample(self, denormalize: bool) -> u8 {
                let value = if denormalize { self * MAX_SAMPLE as $ty } else { self };
                value.round().clamp(0.0, MAX_SAMPLE as $ty) as u8
            }
        }
    )*};
}

macro_rules! impl_int_sample {
    ($($ty:ty),*) => {$(
        impl PixelSample for $ty {
            #[inline]
            fn from_sample(sample: u8) -> Self {
                sample as $ty
            }

            #[inline]
            fn normalized_sample(sample: u8) -> Self {
                (sample / MAX_SAMPLE) as $ty
            }

            #[inline]
            fn to_sample(self, denormalize: bool) -> u8 {
                let value = if denormalize {
                    (self as i128).saturating_mul(MAX_SAMPLE as i128)
                } else {
                    self as i128
                };
                value.clamp(0, MAX_SAMPLE as i128) as u8
            }
        }
    )*};
}

impl_float_sample!(f32, f64);
impl_int_sample!(u8, u16, u32, i16, i32, i64);
