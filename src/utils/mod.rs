//! Internal utility functions for imageops-bgremove.
//!
//! This module contains validation and sample conversion helpers shared by
//! the pipeline stages.

use image::Primitive;
use imageproc::definitions::Clamp;

use crate::error::{Error, Result};

/// Clamps a floating-point value to the range of a primitive type.
///
/// # Arguments
///
/// * `value` - The floating-point value to clamp
///
/// # Returns
///
/// The clamped value as the target primitive type
#[inline]
pub fn clamp_f32_to_primitive<T: Primitive + Clamp<f32>>(value: f32) -> T {
    T::clamp(value)
}

/// Normalizes a sample using a pre-computed max value.
///
/// # Arguments
///
/// * `sample` - The sample value to normalize
/// * `max_value` - The pre-computed maximum value for the type
///
/// # Returns
///
/// The sample as a floating-point number between 0 and 1
#[inline]
pub fn normalize_sample_with_max<S>(sample: S, max_value: f32) -> f32
where
    S: Into<f32> + Primitive,
{
    sample.into() / max_value
}

/// Validates that an image has non-zero dimensions.
///
/// # Returns
///
/// `Ok(())` if the dimensions are valid, otherwise [`Error::EmptyImage`]
pub fn validate_non_empty_image(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        Err(Error::EmptyImage { width, height })
    } else {
        Ok(())
    }
}

/// Validates that two images have matching dimensions.
///
/// # Returns
///
/// `Ok(())` if the dimensions match, otherwise [`Error::DimensionMismatch`]
/// with the first pair as the expected value
pub fn validate_matching_dimensions(expected: (u32, u32), actual: (u32, u32)) -> Result<()> {
    if expected != actual {
        Err(Error::DimensionMismatch { expected, actual })
    } else {
        Ok(())
    }
}
