pub mod channel_normalizer;
pub mod config;
pub mod inference;
pub mod mask_compositor;
pub mod pipeline;
pub mod resampler;
pub mod tensor;
pub mod tensor_codec;

#[cfg(feature = "io")]
pub mod io;
