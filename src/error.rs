use thiserror::Error;

/// Boxed error returned by model runtimes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of [`Error`] values.
///
/// Callers that only need to decide whether to fix their input, give up on
/// the request or look at the model runtime can match on this instead of
/// every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Buffer length or shape does not match the declared dimensions.
    ShapeMismatch,
    /// A parameter or input value is outside the accepted domain.
    InvalidParameter,
    /// The external model runtime failed.
    InferenceFailure,
    /// Reading or writing an image file failed.
    Io,
}

/// Error type for the background removal pipeline
///
/// Every stage is precondition-checked; a violated precondition surfaces as
/// one of these variants and no partial result is returned.
#[derive(Debug, Error)]
pub enum Error {
    /// Raw buffer length does not equal the product of its declared dimensions
    ///
    /// Returned by the channel normalizer when the interleaved pixel buffer
    /// is shorter or longer than `channels * height * width`.
    #[error("Buffer length mismatch: expected {expected} samples, got {actual}")]
    BufferLengthMismatch { expected: usize, actual: usize },

    /// Tensor shape does not match the layout required at this boundary
    #[error("Tensor shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Required shape
        expected: Vec<usize>,
        /// Shape that was supplied
        actual: Vec<usize>,
    },

    /// Image and mask dimensions do not match
    ///
    /// This error occurs when compositing an image with a mask that has
    /// not been resized to the image resolution.
    #[error("Image and mask dimensions do not match: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },

    /// The normalization constants only cover three channels
    #[error("Unsupported channel count {0}: exactly 3 channels are required")]
    UnsupportedChannelCount(usize),

    /// Invalid parameter provided to the operation
    ///
    /// This error is returned for zero resize targets, zero or even blur
    /// kernel sizes and non-finite sigma values.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The input image has a zero dimension
    #[error("Image is empty: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    /// A NaN or infinite sample was found where a min/max rescale is required
    #[error("Non-finite value at index {index}")]
    NonFiniteValue { index: usize },

    /// The model runtime failed to produce an output tensor
    #[error("Model inference failed: {source}")]
    Inference {
        #[source]
        source: BoxError,
    },

    /// Failed to read an image file.
    #[cfg(feature = "io")]
    #[error("Failed to load image from {path}: {source}")]
    ImageLoad {
        path: std::path::PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to decode an in-memory image.
    #[cfg(feature = "io")]
    #[error("Failed to decode image: {source}")]
    ImageDecode {
        #[source]
        source: image::ImageError,
    },

    /// Failed to write an image file.
    #[cfg(feature = "io")]
    #[error("Failed to save image to {path}: {source}")]
    ImageSave {
        path: std::path::PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl Error {
    /// Returns the taxonomy bucket of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::BufferLengthMismatch { .. }
            | Self::ShapeMismatch { .. }
            | Self::DimensionMismatch { .. } => ErrorKind::ShapeMismatch,
            Self::UnsupportedChannelCount(_)
            | Self::InvalidParameter(_)
            | Self::EmptyImage { .. }
            | Self::NonFiniteValue { .. } => ErrorKind::InvalidParameter,
            Self::Inference { .. } => ErrorKind::InferenceFailure,
            #[cfg(feature = "io")]
            Self::ImageLoad { .. } | Self::ImageDecode { .. } | Self::ImageSave { .. } => {
                ErrorKind::Io
            }
        }
    }
}
