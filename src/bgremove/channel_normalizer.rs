use image::Rgb;
use itertools::{Itertools, MinMaxResult};

use crate::bgremove::config::{NormalizationParams, CHANNELS};
use crate::error::{Error, Result};
use crate::utils::{clamp_f32_to_primitive, normalize_sample_with_max, validate_non_empty_image};
use crate::Image;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Converts between interleaved 8-bit pixels and planar normalized floats.
///
/// Encoding scales each sample to `[0, 1]` and applies
/// `(value - mean[c]) / std[c]`. Decoding rescales an arbitrary real-valued
/// buffer to the full 8-bit range using its global minimum and maximum.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelNormalizer {
    params: NormalizationParams,
}

impl ChannelNormalizer {
    pub const fn new(params: NormalizationParams) -> Self {
        Self { params }
    }

    pub const fn params(&self) -> &NormalizationParams {
        &self.params
    }

    /// Convert an interleaved buffer into planar normalized floats.
    ///
    /// The sample of pixel `i`, channel `c` at offset `i * channels + c`
    /// lands at planar offset `c * height * width + i`.
    ///
    /// # Arguments
    ///
    /// * `pixels` - Row-major, channel-interleaved 8-bit samples
    /// * `channels` - Must be 3
    /// * `height`, `width` - Image dimensions in pixels
    ///
    /// # Errors
    ///
    /// * `Error::UnsupportedChannelCount` - When `channels != 3`
    /// * `Error::EmptyImage` - When either dimension is zero
    /// * `Error::BufferLengthMismatch` - When `pixels.len() != channels * height * width`
    pub fn encode(
        &self,
        pixels: &[u8],
        channels: usize,
        height: u32,
        width: u32,
    ) -> Result<Vec<f32>> {
        if channels != CHANNELS {
            return Err(Error::UnsupportedChannelCount(channels));
        }
        validate_non_empty_image(width, height)?;

        let plane_len = height as usize * width as usize;
        let expected = plane_len * CHANNELS;
        if pixels.len() != expected {
            return Err(Error::BufferLengthMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        let mut planes = vec![0.0f32; expected];
        let fill_plane = |(channel, plane): (usize, &mut [f32])| {
            let mean = self.params.mean[channel];
            let std = self.params.std[channel];
            let samples = pixels.iter().skip(channel).step_by(CHANNELS);
            for (value, &sample) in plane.iter_mut().zip(samples) {
                *value = (normalize_sample_with_max(sample, 255.0) - mean) / std;
            }
        };

        #[cfg(feature = "rayon")]
        planes
            .par_chunks_mut(plane_len)
            .enumerate()
            .for_each(fill_plane);

        #[cfg(not(feature = "rayon"))]
        planes.chunks_mut(plane_len).enumerate().for_each(fill_plane);

        Ok(planes)
    }

    /// Encode an RGB image buffer.
    pub fn encode_image(&self, image: &Image<Rgb<u8>>) -> Result<Vec<f32>> {
        let (width, height) = image.dimensions();
        self.encode(image.as_raw(), CHANNELS, height, width)
    }

    /// Rescale a real-valued buffer to 8-bit samples with global min/max.
    ///
    /// `byte = round((v - min) / (max - min) * 255)`, clamped to `[0, 255]`.
    /// A constant buffer decodes to all zeros, and an empty buffer decodes to
    /// an empty buffer.
    ///
    /// # Errors
    ///
    /// * `Error::NonFiniteValue` - When a sample is NaN or infinite
    pub fn decode(values: &[f32]) -> Result<Vec<u8>> {
        if let Some(index) = values.iter().position(|value| !value.is_finite()) {
            return Err(Error::NonFiniteValue { index });
        }

        let (min, max) = match values.iter().copied().minmax() {
            MinMaxResult::NoElements => return Ok(Vec::new()),
            MinMaxResult::OneElement(value) => (value, value),
            MinMaxResult::MinMax(min, max) => (min, max),
        };

        let range = max - min;
        if range <= 0.0 {
            return Ok(vec![0; values.len()]);
        }

        Ok(values
            .iter()
            .map(|&value| clamp_f32_to_primitive::<u8>(((value - min) / range * 255.0).round()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_rgb_image;

    const TOLERANCE: f32 = 1e-5;

    #[test]
    fn encode_single_red_pixel_matches_formula() {
        let normalizer = ChannelNormalizer::default();
        let planes = normalizer.encode(&[255, 0, 0], 3, 1, 1).unwrap();

        assert_eq!(planes.len(), 3);
        assert!((planes[0] - (1.0 - 0.485) / 0.229).abs() < TOLERANCE);
        assert!((planes[1] - (0.0 - 0.456) / 0.224).abs() < TOLERANCE);
        assert!((planes[2] - (0.0 - 0.406) / 0.225).abs() < TOLERANCE);
    }

    #[test]
    fn encode_deinterleaves_into_planes() {
        let normalizer = ChannelNormalizer::new(NormalizationParams::new([0.0; 3], [1.0; 3]));
        let image = create_test_rgb_image();
        let planes = normalizer.encode_image(&image).unwrap();

        // Pixel order is row-major: (0,0), (1,0), (0,1), (1,1)
        let expected_red = [200.0, 100.0, 150.0, 50.0];
        let expected_green = [150.0, 200.0, 100.0, 75.0];
        let expected_blue = [100.0, 150.0, 200.0, 25.0];
        for i in 0..4 {
            assert!((planes[i] - expected_red[i] / 255.0).abs() < TOLERANCE);
            assert!((planes[4 + i] - expected_green[i] / 255.0).abs() < TOLERANCE);
            assert!((planes[8 + i] - expected_blue[i] / 255.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn encode_rejects_wrong_channel_count() {
        let normalizer = ChannelNormalizer::default();
        let result = normalizer.encode(&[0; 16], 4, 2, 2);
        assert!(matches!(result, Err(Error::UnsupportedChannelCount(4))));
    }

    #[test]
    fn encode_rejects_wrong_buffer_length() {
        let normalizer = ChannelNormalizer::default();
        let result = normalizer.encode(&[0; 11], 3, 2, 2);
        assert!(matches!(
            result,
            Err(Error::BufferLengthMismatch {
                expected: 12,
                actual: 11
            })
        ));
    }

    #[test]
    fn encode_rejects_empty_dimensions() {
        let normalizer = ChannelNormalizer::default();
        assert!(matches!(
            normalizer.encode(&[], 3, 0, 4),
            Err(Error::EmptyImage { .. })
        ));
    }

    #[test]
    fn decode_maps_extremes_to_full_range() {
        let decoded = ChannelNormalizer::decode(&[-2.0, 0.0, 2.0, 1.0]).unwrap();
        assert_eq!(decoded, vec![0, 128, 255, 191]);
    }

    #[test]
    fn decode_constant_buffer_is_all_zero() {
        assert_eq!(ChannelNormalizer::decode(&[0.5; 9]).unwrap(), vec![0; 9]);
        assert_eq!(ChannelNormalizer::decode(&[-3.0]).unwrap(), vec![0]);
        assert!(ChannelNormalizer::decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn decode_rejects_non_finite_samples() {
        let result = ChannelNormalizer::decode(&[0.0, f32::NAN, 1.0]);
        assert!(matches!(result, Err(Error::NonFiniteValue { index: 1 })));
    }
}
