//! Background removal with a saliency-mask network.
//!
//! The crate converts arbitrary-size RGB images into the planar normalized
//! tensor a fixed-input network expects, turns the network's raw output back
//! into an 8-bit mask, and composites the original image against the
//! thresholded mask. Running the network is left to a [`SaliencyModel`]
//! implementation supplied by the caller.

mod bgremove;
mod error;
mod utils;

#[cfg(test)]
mod test_utils;

use image::{ImageBuffer, Pixel};

pub use bgremove::channel_normalizer::ChannelNormalizer;
pub use bgremove::config::{
    BlurParams, DisplayMask, NormalizationParams, PipelineConfig, ThresholdMode, CHANNELS,
    NETWORK_INPUT_SIZE,
};
pub use bgremove::inference::{FnModel, ModelSession, SaliencyModel};
pub use bgremove::mask_compositor::{ApplyBinaryMask, Composite, MaskCompositor};
pub use bgremove::pipeline::BackgroundRemover;
pub use bgremove::resampler::{gaussian_kernel, ImageResampler};
pub use bgremove::tensor::Tensor;
pub use bgremove::tensor_codec::TensorCodec;
pub use error::{BoxError, Error, ErrorKind, Result};

#[cfg(feature = "io")]
pub use bgremove::io::{decode_rgb_image, load_rgb_image, save_image};

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
