use ndarray::{ArrayD, IxDyn};

use crate::error::{Error, Result};

/// Shape-tagged flat `f32` buffer in planar, row-major order.
///
/// The buffer length always equals the product of the shape dimensions.
/// Values are immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Tensor {
    /// Create a tensor, checking that `data` fills `shape` exactly.
    ///
    /// # Errors
    ///
    /// * `Error::BufferLengthMismatch` - When `data.len()` differs from the shape's element count
    pub fn new(shape: impl Into<Vec<usize>>, data: Vec<f32>) -> Result<Self> {
        let shape = shape.into();
        let expected = shape.iter().product::<usize>();
        if data.len() != expected {
            return Err(Error::BufferLengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Tensor of `shape` with every element set to `value`.
    pub fn filled(shape: impl Into<Vec<usize>>, value: f32) -> Self {
        let shape = shape.into();
        let len = shape.iter().product();
        Self {
            shape,
            data: vec![value; len],
        }
    }

    /// Copy an `ndarray` array in logical (row-major) order.
    pub fn from_array(array: &ArrayD<f32>) -> Self {
        Self {
            shape: array.shape().to_vec(),
            data: array.iter().copied().collect(),
        }
    }

    /// Copy into an `ndarray` array, e.g. to feed an ONNX-style runtime.
    ///
    /// # Errors
    ///
    /// * `Error::ShapeMismatch` - Never for tensors built through this type's constructors
    pub fn to_array(&self) -> Result<ArrayD<f32>> {
        ArrayD::from_shape_vec(IxDyn(&self.shape), self.data.clone()).map_err(|_| {
            Error::ShapeMismatch {
                expected: self.shape.clone(),
                actual: vec![self.data.len()],
            }
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// The shape with all unit dimensions removed.
    pub fn squeezed_shape(&self) -> Vec<usize> {
        self.shape.iter().copied().filter(|&dim| dim != 1).collect()
    }
}
