use image::{Luma, Rgb, Rgba};
use tracing::{debug, instrument};

use crate::bgremove::config::PipelineConfig;
use crate::bgremove::inference::SaliencyModel;
use crate::bgremove::mask_compositor::{ApplyBinaryMask, Composite, MaskCompositor};
use crate::bgremove::tensor_codec::TensorCodec;
use crate::error::{Error, Result};
use crate::Image;

/// End-to-end background removal for one image at a time.
///
/// Runs preprocess, inference, output decoding and compositing strictly in
/// sequence. The remover holds no per-request state, so a shared reference
/// can serve independent requests from several threads when the model allows it.
#[derive(Debug)]
pub struct BackgroundRemover<M> {
    model: M,
    codec: TensorCodec,
    compositor: MaskCompositor,
}

impl<M: SaliencyModel> BackgroundRemover<M> {
    /// Remover using the reference constants.
    pub fn new(model: M) -> Self {
        Self::with_config(model, &PipelineConfig::default())
    }

    pub fn with_config(model: M, config: &PipelineConfig) -> Self {
        Self {
            model,
            codec: TensorCodec::new(config),
            compositor: MaskCompositor::new(config),
        }
    }

    pub const fn codec(&self) -> &TensorCodec {
        &self.codec
    }

    pub const fn compositor(&self) -> &MaskCompositor {
        &self.compositor
    }

    /// Give the model back, e.g. to reuse a session with other constants.
    pub fn into_model(self) -> M {
        self.model
    }

    /// Produce the raw 8-bit saliency mask at network resolution.
    ///
    /// # Errors
    ///
    /// * `Error::Inference` - When the model runtime fails
    /// * `Error::ShapeMismatch` - When the model output is not a single-channel network-resolution map
    /// * Any preprocessing error for an empty image
    #[instrument(level = "debug", skip_all, fields(width = image.width(), height = image.height()))]
    pub fn segment(&self, image: &Image<Rgb<u8>>) -> Result<Image<Luma<u8>>> {
        let input = self.codec.preprocess(image)?;
        debug!(shape = ?input.shape(), "running inference");

        let output = self
            .model
            .infer(&input)
            .map_err(|source| Error::Inference { source })?;
        debug!(shape = ?output.shape(), "decoding model output");

        self.codec.decode_output(&output)
    }

    /// Segment `image` and blank its background.
    ///
    /// # Errors
    ///
    /// See [`segment`](Self::segment) and [`MaskCompositor::composite`].
    #[instrument(level = "debug", skip_all)]
    pub fn remove_background(&self, image: &Image<Rgb<u8>>) -> Result<Composite> {
        let raw_mask = self.segment(image)?;
        self.compositor.composite(image, &raw_mask)
    }

    /// Segment `image` and return it with the binary mask as alpha channel.
    ///
    /// # Errors
    ///
    /// See [`remove_background`](Self::remove_background).
    pub fn cutout(&self, image: &Image<Rgb<u8>>) -> Result<Image<Rgba<u8>>> {
        let composite = self.remove_background(image)?;
        image.cutout_rgba(&composite.binary_mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bgremove::inference::FnModel;
    use crate::bgremove::tensor::Tensor;
    use crate::error::{BoxError, ErrorKind};
    use crate::test_utils::create_large_test_image;

    fn half_mask_model(input: &Tensor) -> std::result::Result<Tensor, BoxError> {
        assert_eq!(input.shape(), &[3, 320, 320]);
        let data = (0..320 * 320)
            .map(|i| if i % 320 < 160 { 4.0 } else { -4.0 })
            .collect();
        Ok(Tensor::new([1, 1, 320, 320], data)?)
    }

    #[test]
    fn remove_background_keeps_left_half() {
        let remover = BackgroundRemover::new(FnModel::new(half_mask_model));
        let image = create_large_test_image(64, 48);

        let composite = remover.remove_background(&image).unwrap();
        assert_eq!(composite.image.dimensions(), (64, 48));
        assert_eq!(composite.image.get_pixel(0, 0), image.get_pixel(0, 0));
        assert_eq!(composite.image.get_pixel(63, 47), &Rgb([0, 0, 0]));
    }

    #[test]
    fn inference_failure_is_reported_as_inference_error() {
        let remover = BackgroundRemover::new(FnModel::new(|_: &Tensor| {
            Err::<Tensor, BoxError>("device lost".into())
        }));
        let error = remover
            .remove_background(&create_large_test_image(8, 8))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InferenceFailure);
    }

    #[test]
    fn wrong_output_shape_is_shape_mismatch() {
        let remover = BackgroundRemover::new(FnModel::new(|input: &Tensor| Ok(input.clone())));
        let error = remover.segment(&create_large_test_image(8, 8)).unwrap_err();
        assert!(matches!(error, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn cutout_writes_mask_into_alpha() {
        let remover = BackgroundRemover::new(FnModel::new(half_mask_model));
        let image = create_large_test_image(32, 32);
        let cutout = remover.cutout(&image).unwrap();
        assert_eq!(cutout.get_pixel(0, 5)[3], 255);
        assert_eq!(cutout.get_pixel(31, 5)[3], 0);
        assert_eq!(cutout.get_pixel(31, 5)[0], image.get_pixel(31, 5)[0]);
    }
}
