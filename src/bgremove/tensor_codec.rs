use std::borrow::Cow;

use image::{ImageBuffer, Luma, Rgb};
use tracing::debug;

use crate::bgremove::channel_normalizer::ChannelNormalizer;
use crate::bgremove::config::PipelineConfig;
use crate::bgremove::resampler::ImageResampler;
use crate::bgremove::tensor::Tensor;
use crate::error::{Error, Result};
use crate::Image;

/// Produces network input tensors and consumes network output tensors.
///
/// This is the only gateway that builds model input, so every tensor it
/// returns has shape `[3, height, width]` of the configured input size,
/// whatever the size of the source image.
#[derive(Debug, Clone, Copy)]
pub struct TensorCodec {
    normalizer: ChannelNormalizer,
    input_size: (u32, u32),
}

impl Default for TensorCodec {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

impl TensorCodec {
    pub const fn new(config: &PipelineConfig) -> Self {
        Self {
            normalizer: ChannelNormalizer::new(config.normalization),
            input_size: config.input_size,
        }
    }

    /// Network input resolution (width, height).
    pub const fn input_size(&self) -> (u32, u32) {
        self.input_size
    }

    /// Resize `image` to the network resolution if needed and normalize it.
    ///
    /// # Errors
    ///
    /// * `Error::EmptyImage` - When the image has a zero dimension
    /// * `Error::InvalidParameter` - When the configured input size has a zero dimension
    pub fn preprocess(&self, image: &Image<Rgb<u8>>) -> Result<Tensor> {
        let (net_width, net_height) = self.input_size;

        let resized = if image.dimensions() == (net_width, net_height) {
            Cow::Borrowed(image)
        } else {
            debug!(
                from_width = image.width(),
                from_height = image.height(),
                "resizing the input image to {net_width}x{net_height}"
            );
            Cow::Owned(ImageResampler::resize(image, net_width, net_height)?)
        };

        let planes = self.normalizer.encode_image(&resized)?;
        Tensor::new([3, net_height as usize, net_width as usize], planes)
    }

    /// Turn a single-channel network output into an 8-bit mask.
    ///
    /// The tensor must hold exactly `height * width` values, and its shape
    /// with unit dimensions removed must be `[height, width]`; `[1, 1, h, w]`
    /// and `[1, h, w]` are accepted.
    ///
    /// # Errors
    ///
    /// * `Error::ShapeMismatch` - When the tensor is not a single-channel map at network resolution
    /// * `Error::NonFiniteValue` - When the output contains NaN or infinity
    pub fn decode_output(&self, output: &Tensor) -> Result<Image<Luma<u8>>> {
        let (net_width, net_height) = self.input_size;
        let expected = vec![net_height as usize, net_width as usize];

        let expected_squeezed: Vec<usize> =
            expected.iter().copied().filter(|&dim| dim != 1).collect();
        let matches_layout = output.len() == net_width as usize * net_height as usize
            && output.squeezed_shape() == expected_squeezed;
        if !matches_layout {
            return Err(Error::ShapeMismatch {
                expected,
                actual: output.shape().to_vec(),
            });
        }

        let samples = ChannelNormalizer::decode(output.as_slice())?;
        ImageBuffer::from_raw(net_width, net_height, samples).ok_or_else(|| Error::ShapeMismatch {
            expected,
            actual: output.shape().to_vec(),
        })
    }
}
