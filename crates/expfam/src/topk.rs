//! The k-of-m specialization: states with exactly `k` coordinates set.
//!
//! Enumeration walks every k-combination of the m coordinates and is checked
//! against the closed-form C(m, k) count. MAP skips the enumeration entirely
//! and selects the k largest parameter coordinates directly.

use std::sync::OnceLock;

use burn::prelude::*;
use burn::tensor::TensorData;
use itertools::Itertools;

use crate::bridge::{matrix_to_vec, tensor_to_vec, vec_to_tensor};
use crate::error::FamilyError;
use crate::family::ExpFamily;

/// Configuration for a [`TopK`] family.
#[derive(Config, Debug)]
pub struct TopKConfig {
    /// Dimensionality of the parameter vector and of every state.
    pub m: usize,
    /// Number of coordinates set to one in every admissible state.
    pub k: usize,
}

impl TopKConfig {
    /// Build the family on the given device.
    ///
    /// # Errors
    /// Returns [`FamilyError::InvalidConstraint`] unless `1 <= k <= m`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<TopK<B>, FamilyError> {
        if self.k < 1 || self.k > self.m {
            return Err(FamilyError::InvalidConstraint {
                k: self.k,
                m: self.m,
            });
        }
        Ok(TopK {
            m: self.m,
            k: self.k,
            device: device.clone(),
            states: OnceLock::new(),
        })
    }
}

/// Exponential family over all k-element subsets of m coordinates.
///
/// The state matrix is enumerated on first use and cached behind a one-time
/// initialization guard, so concurrent first access is safe. MAP and its
/// batched variant run in `O(m log m)` per vector instead of touching the
/// C(m, k) enumeration.
pub struct TopK<B: Backend> {
    m: usize,
    k: usize,
    device: B::Device,
    states: OnceLock<Tensor<B, 2>>,
}

impl<B: Backend> TopK<B> {
    /// Number of coordinates set in every admissible state.
    pub fn k(&self) -> usize {
        self.k
    }

    /// MAP applied independently to every row of a `(batch, m)` input.
    ///
    /// Row `i` of the result equals `map` of row `i` of the input; the
    /// batched form exists for throughput only.
    ///
    /// # Panics
    /// Panics if the input does not have `m` columns.
    pub fn map_2d(&self, theta_batch: &Tensor<B, 2>) -> Tensor<B, 2> {
        let [batch, m] = theta_batch.dims();
        assert_eq!(m, self.m, "theta batch has {m} columns, expected {}", self.m);

        let values = matrix_to_vec(theta_batch.clone());
        let mut flat = vec![0.0_f32; batch * m];
        for row in 0..batch {
            let row_values = &values[row * m..(row + 1) * m];
            for index in top_indices(row_values, self.k) {
                flat[row * m + index] = 1.0;
            }
        }
        Tensor::from_data(TensorData::new(flat, [batch, m]), &self.device)
    }

    // TODO: stream the enumeration instead of materializing every row, so
    // large m-choose-k supports stop being memory-bound.
    fn enumerate(&self) -> Tensor<B, 2> {
        let expected = binomial(self.m, self.k);
        let mut flat: Vec<f32> = Vec::with_capacity(expected * self.m);
        let mut n_states = 0;
        for combination in (0..self.m).combinations(self.k) {
            let mut row = vec![0.0_f32; self.m];
            for index in combination {
                row[index] = 1.0;
            }
            flat.extend_from_slice(&row);
            n_states += 1;
        }
        assert_eq!(
            n_states, expected,
            "enumeration produced {n_states} states for {} choose {}, expected {expected}",
            self.m, self.k
        );
        tracing::debug!(n_states, m = self.m, k = self.k, "materialized state matrix");
        Tensor::from_data(TensorData::new(flat, [n_states, self.m]), &self.device)
    }
}

impl<B: Backend> ExpFamily<B> for TopK<B> {
    fn dim(&self) -> usize {
        self.m
    }

    fn device(&self) -> &B::Device {
        &self.device
    }

    fn states(&self) -> &Tensor<B, 2> {
        self.states.get_or_init(|| self.enumerate())
    }

    /// Order-statistics MAP: mark the k largest coordinates of θ.
    ///
    /// Agrees with the enumerated argmax for tie-free θ; among equal
    /// coordinates the lower index wins a slot.
    fn map(&self, theta: &Tensor<B, 1>) -> Tensor<B, 1> {
        let values = tensor_to_vec(theta.clone());
        assert_eq!(
            values.len(),
            self.m,
            "theta has length {}, expected {}",
            values.len(),
            self.m
        );
        let mut state = vec![0.0_f32; self.m];
        for index in top_indices(&values, self.k) {
            state[index] = 1.0;
        }
        vec_to_tensor(state, &self.device)
    }
}

/// Indices of the `k` largest values, descending, lower index first among
/// equal values.
fn top_indices(values: &[f64], k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]).then_with(|| a.cmp(&b)));
    order.truncate(k);
    order
}

/// Exact C(m, k) via the multiplicative formula; every intermediate product
/// of `i + 1` consecutive integers is divisible by `(i + 1)!`.
fn binomial(m: usize, k: usize) -> usize {
    let k = k.min(m - k);
    let mut count: u128 = 1;
    for i in 0..k {
        count = count * (m - i) as u128 / (i + 1) as u128;
    }
    count as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArray;
    use std::collections::HashSet;

    type TestBackend = NdArray<f32>;

    fn family(m: usize, k: usize) -> TopK<TestBackend> {
        TopKConfig::new(m, k).init(&Default::default()).unwrap()
    }

    #[test]
    fn test_enumeration_count_and_row_structure() {
        let family = family(4, 2);
        assert_eq!(family.n_states(), 6);

        let values = matrix_to_vec(family.states().clone());
        let mut seen = HashSet::new();
        for row in values.chunks(4) {
            let ones = row.iter().filter(|v| **v == 1.0).count();
            let zeros = row.iter().filter(|v| **v == 0.0).count();
            assert_eq!(ones, 2, "row {row:?} must have exactly k ones");
            assert_eq!(zeros, 2, "row {row:?} must be binary");
            let key: Vec<u8> = row.iter().map(|v| *v as u8).collect();
            assert!(seen.insert(key), "duplicate state {row:?}");
        }
    }

    #[test]
    fn test_degenerate_subset_sizes() {
        let all = family(3, 3);
        assert_eq!(all.n_states(), 1);
        assert_eq!(matrix_to_vec(all.states().clone()), vec![1.0, 1.0, 1.0]);

        let singletons = family(3, 1);
        assert_eq!(singletons.n_states(), 3);
        let values = matrix_to_vec(singletons.states().clone());
        for (index, row) in values.chunks(3).enumerate() {
            assert_eq!(row.iter().sum::<f64>(), 1.0);
            assert_eq!(row[index], 1.0, "row {index} should select coordinate {index}");
        }
    }

    #[test]
    fn test_invalid_constraints_are_rejected() {
        let device = <TestBackend as Backend>::Device::default();
        let zero = TopKConfig::new(4, 0).init::<TestBackend>(&device);
        assert!(matches!(
            zero,
            Err(FamilyError::InvalidConstraint { k: 0, m: 4 })
        ));

        let oversized = TopKConfig::new(4, 5).init::<TestBackend>(&device);
        assert!(matches!(
            oversized,
            Err(FamilyError::InvalidConstraint { k: 5, m: 4 })
        ));
    }

    #[test]
    fn test_states_cached_across_calls() {
        let family = family(5, 2);
        let first = matrix_to_vec(family.states().clone());
        let second = matrix_to_vec(family.states().clone());
        assert_eq!(first, second);
        assert_eq!(family.n_states(), 10);
    }

    #[test]
    fn test_map_agrees_with_enumerated_argmax() {
        let device = Default::default();
        let family = family(6, 3);
        let theta = vec_to_tensor::<TestBackend>(vec![0.9, -1.2, 2.1, 0.3, 1.4, -0.5], &device);

        let fast = tensor_to_vec(family.map(&theta));
        let exact = tensor_to_vec(family.map_enumerated(&theta));
        assert_eq!(fast, exact);
        assert_eq!(fast, vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_map_tie_prefers_lower_coordinates() {
        let device = Default::default();
        let family = family(5, 2);
        let theta = vec_to_tensor::<TestBackend>(vec![0.0; 5], &device);

        let state = tensor_to_vec(family.map(&theta));
        assert_eq!(state, vec![1.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_map_2d_rows_match_single_map() {
        let device = Default::default();
        let family = family(5, 2);
        let rows: [[f32; 5]; 3] = [
            [0.1, 0.7, -0.4, 1.9, 0.0],
            [-2.0, -1.0, -3.0, -0.5, -1.5],
            [5.0, 4.0, 3.0, 2.0, 1.0],
        ];
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        let batch = Tensor::<TestBackend, 2>::from_data(TensorData::new(flat, [3, 5]), &device);

        let mapped = matrix_to_vec(family.map_2d(&batch));
        for (index, row) in rows.iter().enumerate() {
            let theta = vec_to_tensor::<TestBackend>(row.to_vec(), &device);
            let single = tensor_to_vec(family.map(&theta));
            assert_eq!(
                &mapped[index * 5..(index + 1) * 5],
                single.as_slice(),
                "row {index} disagrees with the single-vector map"
            );
        }
    }
}
