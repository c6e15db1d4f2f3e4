//! Capability interface for the saliency network.
//!
//! The pipeline never runs a network itself. A runtime (ONNX, Torch, a
//! remote service, a test double) implements [`SaliencyModel`] and is handed
//! to [`BackgroundRemover`](crate::BackgroundRemover), usually wrapped in a
//! [`ModelSession`] so the runtime is released on every exit path.

use std::ops::Deref;

use tracing::debug;

use crate::bgremove::tensor::Tensor;
use crate::error::BoxError;

/// A network mapping a `[3, H, W]` input tensor to a single-channel saliency map.
pub trait SaliencyModel {
    /// Run the network once.
    ///
    /// # Errors
    ///
    /// Any runtime failure. The pipeline reports it as `Error::Inference`
    /// without retrying.
    fn infer(&self, input: &Tensor) -> Result<Tensor, BoxError>;

    /// Free runtime resources. Called once by [`ModelSession`] on drop.
    fn release(&mut self) {}
}

impl<M: SaliencyModel + ?Sized> SaliencyModel for &M {
    fn infer(&self, input: &Tensor) -> Result<Tensor, BoxError> {
        (**self).infer(input)
    }
}

impl<M: SaliencyModel + ?Sized> SaliencyModel for Box<M> {
    fn infer(&self, input: &Tensor) -> Result<Tensor, BoxError> {
        (**self).infer(input)
    }

    fn release(&mut self) {
        (**self).release();
    }
}

/// Adapter turning a closure into a [`SaliencyModel`].
///
/// ```
/// use imageops_bgremove::{FnModel, SaliencyModel, Tensor};
///
/// let model = FnModel::new(|_input: &Tensor| Ok(Tensor::filled([1, 1, 320, 320], 0.5)));
/// let output = model.infer(&Tensor::filled([3, 320, 320], 0.0)).unwrap();
/// assert_eq!(output.shape(), &[1, 1, 320, 320]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnModel<F>(F);

impl<F> FnModel<F>
where
    F: Fn(&Tensor) -> Result<Tensor, BoxError>,
{
    pub fn new(infer: F) -> Self {
        Self(infer)
    }
}

impl<F> SaliencyModel for FnModel<F>
where
    F: Fn(&Tensor) -> Result<Tensor, BoxError>,
{
    fn infer(&self, input: &Tensor) -> Result<Tensor, BoxError> {
        (self.0)(input)
    }
}

/// Scoped handle owning a loaded model.
///
/// The model's [`SaliencyModel::release`] runs exactly once when the session
/// is dropped, including when a request fails or a panic unwinds through the
/// owner.
#[derive(Debug)]
pub struct ModelSession<M: SaliencyModel> {
    model: M,
}

impl<M: SaliencyModel> ModelSession<M> {
    pub const fn new(model: M) -> Self {
        Self { model }
    }

    /// Load a model through `loader` and wrap it in a session.
    ///
    /// # Errors
    ///
    /// Whatever `loader` returns; nothing is acquired in that case.
    pub fn open<E>(loader: impl FnOnce() -> Result<M, E>) -> Result<Self, E> {
        loader().map(Self::new)
    }
}

impl<M: SaliencyModel> Deref for ModelSession<M> {
    type Target = M;

    fn deref(&self) -> &M {
        &self.model
    }
}

impl<M: SaliencyModel> SaliencyModel for ModelSession<M> {
    fn infer(&self, input: &Tensor) -> Result<Tensor, BoxError> {
        self.model.infer(input)
    }
}

impl<M: SaliencyModel> Drop for ModelSession<M> {
    fn drop(&mut self) {
        debug!("releasing model session");
        self.model.release();
    }
}
