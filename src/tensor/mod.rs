//! Literal tensor values carried by graph nodes
//!
//! This module provides the constant-tensor type used for initializers:
//! - [`Tensor`]: typed ndarray storage (`f32` or `i64`)
//! - Shape utilities (`shape`)
//! - Conversion and broadcasting helpers (`convert`)
//!
//! # Example
//!
//! ```ignore
//! use onnx_chain_opt::tensor::{vec_to_tensor_f32, Tensor};
//!
//! let bias = vec_to_tensor_f32(&[0.5, 1.0]);
//! let reshaped = bias.reshape(&[2, 1, 1])?;
//! ```

pub mod convert;
pub mod shape;

use ndarray::{ArrayD, IxDyn};

use crate::error::{GraphResult, TransformError};

// Re-export commonly used items
pub use convert::{channel_vector, vec_to_tensor_f32, vec_to_tensor_i64};
pub use shape::{numel, resolve_reshape};

/// Constant tensor attached to a node input
#[derive(Debug, Clone, PartialEq)]
pub enum Tensor {
    /// 32-bit float data (weights, biases, scales)
    Float(ArrayD<f32>),
    /// 64-bit integer data (shape and index literals)
    Int64(ArrayD<i64>),
}

impl Tensor {
    /// Element type name, used in error messages
    pub fn dtype_name(&self) -> &'static str {
        match self {
            Tensor::Float(_) => "float32",
            Tensor::Int64(_) => "int64",
        }
    }

    /// Tensor dimensions
    pub fn shape(&self) -> &[usize] {
        match self {
            Tensor::Float(a) => a.shape(),
            Tensor::Int64(a) => a.shape(),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            Tensor::Float(a) => a.len(),
            Tensor::Int64(a) => a.len(),
        }
    }

    /// Check if the tensor holds no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow float data
    pub fn as_f32(&self) -> GraphResult<&ArrayD<f32>> {
        match self {
            Tensor::Float(a) => Ok(a),
            other => Err(TransformError::InvalidDataType {
                expected: "float32",
                found: other.dtype_name(),
            }),
        }
    }

    /// Borrow integer data
    pub fn as_i64(&self) -> GraphResult<&ArrayD<i64>> {
        match self {
            Tensor::Int64(a) => Ok(a),
            other => Err(TransformError::InvalidDataType {
                expected: "int64",
                found: other.dtype_name(),
            }),
        }
    }

    /// Reshape without touching the data order
    ///
    /// `target` follows ONNX Reshape semantics (see [`resolve_reshape`]).
    /// An element count mismatch is a [`TransformError::ShapeMismatch`].
    pub fn reshape(&self, target: &[i64]) -> GraphResult<Tensor> {
        let dims = resolve_reshape(self.shape(), target)?;
        match self {
            Tensor::Float(a) => reshape_array(a, &dims).map(Tensor::Float),
            Tensor::Int64(a) => reshape_array(a, &dims).map(Tensor::Int64),
        }
    }
}

impl From<ArrayD<f32>> for Tensor {
    fn from(array: ArrayD<f32>) -> Self {
        Tensor::Float(array)
    }
}

impl From<ArrayD<i64>> for Tensor {
    fn from(array: ArrayD<i64>) -> Self {
        Tensor::Int64(array)
    }
}

fn reshape_array<T: Clone>(array: &ArrayD<T>, dims: &[usize]) -> GraphResult<ArrayD<T>> {
    // Logical (row-major) iteration order, independent of memory layout
    let data: Vec<T> = array.iter().cloned().collect();
    ArrayD::from_shape_vec(IxDyn(dims), data)
        .map_err(|e| TransformError::ShapeMismatch(e.to_string()))
}
