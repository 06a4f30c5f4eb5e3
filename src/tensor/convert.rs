//! Tensor conversion utilities
//!
//! Build literal tensors from plain vectors and view constant operands as
//! per-channel vectors for broadcast fusions.

use ndarray::Array1;

use super::Tensor;

/// Create 1D float tensor from slice
pub fn vec_to_tensor_f32(data: &[f32]) -> Tensor {
    Tensor::Float(Array1::from(data.to_vec()).into_dyn())
}

/// Create 1D integer tensor from slice
pub fn vec_to_tensor_i64(data: &[i64]) -> Tensor {
    Tensor::Int64(Array1::from(data.to_vec()).into_dyn())
}

/// View a constant operand as a per-channel vector of length `channels`
///
/// An operand broadcast along the channel axis (`broadcast=1, axis=1`) is
/// accepted when it holds exactly `channels` elements, whatever its shape
/// (`(C,)`, `(C,1,1)`, ...), or a single element, which is repeated.
/// Returns `None` for integer tensors and any other element count.
pub fn channel_vector(tensor: &Tensor, channels: usize) -> Option<Array1<f32>> {
    let array = tensor.as_f32().ok()?;
    match array.len() {
        n if n == channels => Some(array.iter().copied().collect()),
        1 => array
            .iter()
            .next()
            .map(|&v| Array1::from_elem(channels, v)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    #[test]
    fn test_vec_to_tensor() {
        let t = vec_to_tensor_i64(&[1, 2, 3]);
        assert_eq!(t.shape(), &[3]);
        assert_eq!(t.as_i64().unwrap().iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_channel_vector_exact() {
        let t = Tensor::Float(
            ArrayD::from_shape_vec(IxDyn(&[3, 1, 1]), vec![1.0, 2.0, 3.0]).unwrap(),
        );
        let v = channel_vector(&t, 3).unwrap();
        assert_eq!(v.to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_channel_vector_scalar() {
        let t = vec_to_tensor_f32(&[2.0]);
        let v = channel_vector(&t, 4).unwrap();
        assert_eq!(v.to_vec(), vec![2.0; 4]);
    }

    #[test]
    fn test_channel_vector_rejects() {
        assert!(channel_vector(&vec_to_tensor_f32(&[1.0, 2.0]), 3).is_none());
        assert!(channel_vector(&vec_to_tensor_i64(&[1, 2, 3]), 3).is_none());
    }
}
