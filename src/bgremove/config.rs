//! Fixed pipeline constants, carried as an immutable configuration value.
//!
//! The reference network (U²-Net, 320×320 input) is described by
//! [`PipelineConfig::default`]. Stages receive the value at construction so
//! tests can substitute other constants.

use image::Rgb;

/// Side length of the reference network input.
pub const NETWORK_INPUT_SIZE: u32 = 320;

/// Number of color channels the normalization constants cover.
pub const CHANNELS: usize = 3;

/// Per-channel mean and standard deviation applied after scaling samples to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationParams {
    /// Channel means in RGB order
    pub mean: [f32; CHANNELS],
    /// Channel standard deviations in RGB order
    pub std: [f32; CHANNELS],
}

impl NormalizationParams {
    /// ImageNet statistics the reference network was trained with.
    pub const IMAGENET: Self = Self {
        mean: [0.485, 0.456, 0.406],
        std: [0.229, 0.224, 0.225],
    };

    pub const fn new(mean: [f32; CHANNELS], std: [f32; CHANNELS]) -> Self {
        Self { mean, std }
    }
}

impl Default for NormalizationParams {
    fn default() -> Self {
        Self::IMAGENET
    }
}

/// How the thresholding stage maps mask values to the binary range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdMode {
    /// `value > cutoff` becomes 255, everything else 0
    #[default]
    Binary,
    /// `value > cutoff` becomes 0, everything else 255
    BinaryInverted,
}

/// Which mask the compositor hands back for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMask {
    /// The blurred mask resized to the original resolution, before thresholding
    #[default]
    PreThreshold,
    /// The binary mask used for compositing
    PostThreshold,
}

/// Gaussian blur applied to the raw mask before resizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurParams {
    /// Kernel width and height, both odd
    pub kernel_size: (u32, u32),
    /// Standard deviation; zero or negative derives it from the kernel size
    pub sigma: f32,
}

impl Default for BlurParams {
    fn default() -> Self {
        Self {
            kernel_size: (3, 3),
            sigma: 0.0,
        }
    }
}

/// Constants for one background removal pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Network input resolution (width, height)
    pub input_size: (u32, u32),
    pub normalization: NormalizationParams,
    pub blur: BlurParams,
    /// Cutoff on the 0–255 scale
    pub threshold: u8,
    pub threshold_mode: ThresholdMode,
    /// Value written where the binary mask is zero
    pub background: Rgb<u8>,
    pub display_mask: DisplayMask,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_size: (NETWORK_INPUT_SIZE, NETWORK_INPUT_SIZE),
            normalization: NormalizationParams::IMAGENET,
            blur: BlurParams::default(),
            threshold: 140,
            threshold_mode: ThresholdMode::Binary,
            background: Rgb([0, 0, 0]),
            display_mask: DisplayMask::PreThreshold,
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub const fn with_input_size(mut self, width: u32, height: u32) -> Self {
        self.input_size = (width, height);
        self
    }

    #[must_use]
    pub const fn with_normalization(mut self, normalization: NormalizationParams) -> Self {
        self.normalization = normalization;
        self
    }

    #[must_use]
    pub const fn with_blur(mut self, kernel_size: (u32, u32), sigma: f32) -> Self {
        self.blur = BlurParams { kernel_size, sigma };
        self
    }

    #[must_use]
    pub const fn with_threshold(mut self, threshold: u8, mode: ThresholdMode) -> Self {
        self.threshold = threshold;
        self.threshold_mode = mode;
        self
    }

    #[must_use]
    pub const fn with_background(mut self, background: Rgb<u8>) -> Self {
        self.background = background;
        self
    }

    #[must_use]
    pub const fn with_display_mask(mut self, display_mask: DisplayMask) -> Self {
        self.display_mask = display_mask;
        self
    }

    /// Shape of the tensor fed to the network: `[channels, height, width]`.
    pub const fn input_shape(&self) -> [usize; 3] {
        [
            CHANNELS,
            self.input_size.1 as usize,
            self.input_size.0 as usize,
        ]
    }
}
