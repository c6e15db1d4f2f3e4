use image::{GenericImageView, Luma, Rgb, Rgba};
use imageproc::map::{map_colors, map_colors2};
use tracing::debug;

use crate::bgremove::config::{BlurParams, DisplayMask, PipelineConfig, ThresholdMode};
use crate::bgremove::resampler::ImageResampler;
use crate::error::Result;
use crate::utils::{validate_matching_dimensions, validate_non_empty_image};
use crate::Image;

/// Output of [`MaskCompositor::composite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composite {
    /// Original pixels inside the mask, background value elsewhere
    pub image: Image<Rgb<u8>>,
    /// Mask at the original resolution, kept for inspection
    pub display_mask: Image<Luma<u8>>,
    /// The `{0, 255}` mask used to select pixels
    pub binary_mask: Image<Luma<u8>>,
}

/// Trait providing functionality to select image pixels with a binary mask
///
/// Unlike blending with an alpha mask, any non-zero mask value selects the
/// pixel unchanged and a zero value selects the background.
pub trait ApplyBinaryMask {
    /// Copies pixels where `mask` is non-zero and writes `background` elsewhere
    ///
    /// # Errors
    ///
    /// * `Error::DimensionMismatch` - When image and mask dimensions don't match
    fn apply_binary_mask(
        &self,
        mask: &Image<Luma<u8>>,
        background: Rgb<u8>,
    ) -> Result<Image<Rgb<u8>>>;

    /// Keeps every color sample and stores the mask in a new alpha channel
    ///
    /// Mask values 255 and 0 become fully opaque and fully transparent.
    ///
    /// # Errors
    ///
    /// * `Error::DimensionMismatch` - When image and mask dimensions don't match
    fn cutout_rgba(&self, mask: &Image<Luma<u8>>) -> Result<Image<Rgba<u8>>>;
}

impl ApplyBinaryMask for Image<Rgb<u8>> {
    fn apply_binary_mask(
        &self,
        mask: &Image<Luma<u8>>,
        background: Rgb<u8>,
    ) -> Result<Image<Rgb<u8>>> {
        validate_dimensions(self, mask)?;

        Ok(map_colors2(self, mask, |pixel, Luma([value])| {
            if value != 0 {
                pixel
            } else {
                background
            }
        }))
    }

    fn cutout_rgba(&self, mask: &Image<Luma<u8>>) -> Result<Image<Rgba<u8>>> {
        validate_dimensions(self, mask)?;

        Ok(map_colors2(self, mask, |Rgb([red, green, blue]), Luma([alpha])| {
            Rgba([red, green, blue, alpha])
        }))
    }
}

/// Function to validate dimensions
#[inline]
fn validate_dimensions<I1, I2>(image: &I1, mask: &I2) -> Result<()>
where
    I1: GenericImageView,
    I2: GenericImageView,
{
    validate_matching_dimensions(image.dimensions(), mask.dimensions())
}

/// Turns a raw network-resolution mask into a binary mask at image resolution
/// and composites the original image against it.
///
/// Stages: blur, resize to the original size, threshold, pixel selection.
#[derive(Debug, Clone, Copy)]
pub struct MaskCompositor {
    blur: BlurParams,
    threshold: u8,
    threshold_mode: ThresholdMode,
    background: Rgb<u8>,
    display_mask: DisplayMask,
}

impl Default for MaskCompositor {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

impl MaskCompositor {
    pub const fn new(config: &PipelineConfig) -> Self {
        Self {
            blur: config.blur,
            threshold: config.threshold,
            threshold_mode: config.threshold_mode,
            background: config.background,
            display_mask: config.display_mask,
        }
    }

    /// Run blur, resize, threshold and compositing.
    ///
    /// The returned image always has the dimensions of `original`.
    ///
    /// # Errors
    ///
    /// * `Error::EmptyImage` - When either input has a zero dimension
    /// * `Error::InvalidParameter` - When the configured blur kernel is invalid
    pub fn composite(
        &self,
        original: &Image<Rgb<u8>>,
        raw_mask: &Image<Luma<u8>>,
    ) -> Result<Composite> {
        let (width, height) = original.dimensions();
        validate_non_empty_image(width, height)?;

        let blurred = ImageResampler::blur(raw_mask, self.blur.kernel_size, self.blur.sigma)?;
        let resized = ImageResampler::resize(&blurred, width, height)?;
        let binary_mask = self.threshold(&resized);
        let image = original.apply_binary_mask(&binary_mask, self.background)?;

        debug!(
            width,
            height,
            mask_width = raw_mask.width(),
            mask_height = raw_mask.height(),
            "composited image against binary mask"
        );

        let display_mask = match self.display_mask {
            DisplayMask::PreThreshold => resized,
            DisplayMask::PostThreshold => binary_mask.clone(),
        };

        Ok(Composite {
            image,
            display_mask,
            binary_mask,
        })
    }

    /// Collapse every mask value to 0 or 255 using the configured cutoff.
    pub fn threshold(&self, mask: &Image<Luma<u8>>) -> Image<Luma<u8>> {
        let cutoff = self.threshold;
        let (above, below) = match self.threshold_mode {
            ThresholdMode::Binary => (u8::MAX, 0),
            ThresholdMode::BinaryInverted => (0, u8::MAX),
        };
        map_colors(mask, |Luma([value])| {
            Luma([if value > cutoff { above } else { below }])
        })
    }
}
