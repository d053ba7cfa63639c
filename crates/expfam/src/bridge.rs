//! Conversions between burn tensors and plain vectors.
//!
//! The linear algebra (weights, partition, marginals) runs on burn tensors;
//! order statistics and categorical drawing run CPU-side over `Vec<f64>`.
//! This module is the boundary between the two.

use burn::prelude::*;
use burn::tensor::TensorData;

/// Upload a vector of values as a 1-D tensor on the given device.
///
/// # Panics
/// Panics if `values` is empty.
pub fn vec_to_tensor<B: Backend>(values: Vec<f32>, device: &B::Device) -> Tensor<B, 1> {
    assert!(!values.is_empty(), "values must not be empty");
    let len = values.len();
    Tensor::from_data(TensorData::new(values, [len]), device)
}

/// Extract f64 values from a burn 1-D tensor.
pub fn tensor_to_vec<B: Backend>(tensor: Tensor<B, 1>) -> Vec<f64> {
    tensor
        .into_data()
        .to_vec::<f32>()
        .unwrap()
        .into_iter()
        .map(|v| v as f64)
        .collect()
}

/// Extract f64 values from a burn 2-D tensor, row-major.
pub fn matrix_to_vec<B: Backend>(tensor: Tensor<B, 2>) -> Vec<f64> {
    tensor
        .into_data()
        .to_vec::<f32>()
        .unwrap()
        .into_iter()
        .map(|v| v as f64)
        .collect()
}

/// Extract a single f64 scalar from a burn 1-D tensor.
///
/// # Panics
/// Panics if the tensor does not contain exactly one element.
pub fn tensor_to_f64<B: Backend>(tensor: Tensor<B, 1>) -> f64 {
    let value: f32 = tensor.into_scalar().elem();
    value as f64
}
