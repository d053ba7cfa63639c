//! The exponential-family abstraction over an enumerable binary support.
//!
//! Implementations supply the support (the `(n_states, m)` state matrix) and
//! may override MAP with a constraint-specific algorithm; every other
//! operation is derived here. All derived quantities are exact and computed
//! over the full enumeration, which is the intended regime for moderate
//! state counts.

use burn::prelude::*;
use rand::Rng;

use crate::bridge::tensor_to_vec;

/// A discrete exponential family `p(s) ∝ exp(<s, θ>)` over a finite set of
/// binary states.
///
/// Required methods describe the support; provided methods derive the
/// distribution. [`map`](Self::map) defaults to the exact
/// argmax-over-enumeration path and is the override point for constraints
/// with a cheaper MAP (see [`TopK`](crate::topk::TopK)).
pub trait ExpFamily<B: Backend> {
    /// Length of the parameter vector and of every state vector.
    fn dim(&self) -> usize;

    /// Device on which states and results are materialized.
    fn device(&self) -> &B::Device;

    /// The `(n_states, dim)` 0/1 matrix of admissible states, one per row.
    ///
    /// Computed on first access and cached for the lifetime of the value;
    /// the row order is fixed once materialized.
    fn states(&self) -> &Tensor<B, 2>;

    /// Number of admissible states.
    fn n_states(&self) -> usize {
        self.states().dims()[0]
    }

    /// A single state as a `(dim,)` tensor.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    fn state_row(&self, index: usize) -> Tensor<B, 1> {
        let m = self.dim();
        self.states()
            .clone()
            .slice([index..index + 1, 0..m])
            .reshape([m])
    }

    /// Un-normalized log-weights `states · θ`, shape `(n_states,)`.
    fn weights(&self, theta: &Tensor<B, 1>) -> Tensor<B, 1> {
        let column = theta.clone().unsqueeze_dim::<2>(1); // (dim, 1)
        self.states().clone().matmul(column).squeeze::<1>(1)
    }

    /// `log Σ_s exp(<s, θ>)`, shape `(1,)`.
    ///
    /// Computed with max-subtraction so large weights do not overflow.
    fn log_partition(&self, theta: &Tensor<B, 1>) -> Tensor<B, 1> {
        let weights = self.weights(theta);
        let peak = weights.clone().max();
        (weights - peak.clone()).exp().sum().log() + peak
    }

    /// Probability mass over the enumerated states, shape `(n_states,)`.
    ///
    /// Non-negative and sums to 1 up to floating-point rounding.
    fn pmf(&self, theta: &Tensor<B, 1>) -> Tensor<B, 1> {
        let weights = self.weights(theta);
        let log_z = self.log_partition(theta);
        (weights - log_z).exp()
    }

    /// Expected state vector under `pmf(θ)`, shape `(dim,)`.
    ///
    /// Equals the gradient of the log-partition with respect to θ, which is
    /// why it doubles as the baseline of the score-function estimator.
    fn marginals(&self, theta: &Tensor<B, 1>) -> Tensor<B, 1> {
        let row = self.pmf(theta).unsqueeze_dim::<2>(0); // (1, n_states)
        row.matmul(self.states().clone()).squeeze::<1>(0)
    }

    /// Draw one state from `pmf(θ)` with the supplied generator.
    ///
    /// Each row is returned with probability equal to its pmf entry, and the
    /// draw sequence is reproducible for a fixed generator state.
    fn sample_with_rng<R: Rng + ?Sized>(&self, theta: &Tensor<B, 1>, rng: &mut R) -> Tensor<B, 1> {
        let pmf = tensor_to_vec(self.pmf(theta));
        self.state_row(draw_index(&pmf, rng))
    }

    /// Draw one state from `pmf(θ)` with a fresh entropy-seeded generator.
    fn sample(&self, theta: &Tensor<B, 1>) -> Tensor<B, 1> {
        self.sample_with_rng(theta, &mut rand::thread_rng())
    }

    /// Curried sampler closing over a fixed generator, for callers that must
    /// thread one generator through repeated draws.
    fn sampler<R: Rng>(&self, mut rng: R) -> impl FnMut(&Tensor<B, 1>) -> Tensor<B, 1>
    where
        Self: Sized,
    {
        move |theta| self.sample_with_rng(theta, &mut rng)
    }

    /// The state with maximal weight, found by scanning the enumeration.
    ///
    /// Ties keep the lowest state index. Always available, even where
    /// [`map`](Self::map) is overridden, so the two paths can be compared.
    fn map_enumerated(&self, theta: &Tensor<B, 1>) -> Tensor<B, 1> {
        let weights = tensor_to_vec(self.weights(theta));
        let mut best = 0;
        for (index, weight) in weights.iter().enumerate().skip(1) {
            if *weight > weights[best] {
                best = index;
            }
        }
        self.state_row(best)
    }

    /// The mode of the distribution.
    ///
    /// Defaults to [`map_enumerated`](Self::map_enumerated); specializations
    /// override this with a non-enumerative algorithm.
    fn map(&self, theta: &Tensor<B, 1>) -> Tensor<B, 1> {
        self.map_enumerated(theta)
    }
}

/// Categorical draw by cumulative walk. The final index absorbs the
/// floating-point dust left when the mass does not sum exactly to one.
fn draw_index<R: Rng + ?Sized>(pmf: &[f64], rng: &mut R) -> usize {
    let u: f64 = rng.gen();
    let mut acc = 0.0;
    for (index, mass) in pmf.iter().enumerate() {
        acc += mass;
        if u < acc {
            return index;
        }
    }
    pmf.len() - 1
}

/// The generic variant: an exponential family over an explicitly supplied
/// state matrix, for constraints the caller enumerates themselves.
pub struct Enumerated<B: Backend> {
    states: Tensor<B, 2>,
    device: B::Device,
    m: usize,
}

impl<B: Backend> Enumerated<B> {
    /// Wrap an existing `(n_states, dim)` 0/1 state matrix.
    ///
    /// The rows are taken as-is; callers are responsible for supplying
    /// binary rows that satisfy their constraint.
    ///
    /// # Panics
    /// Panics if the matrix has no rows or no columns.
    pub fn from_states(states: Tensor<B, 2>) -> Self {
        let [n_states, m] = states.dims();
        assert!(n_states > 0, "state matrix must have at least one row");
        assert!(m > 0, "state dimensionality must be positive");
        let device = states.device();
        Self { states, device, m }
    }
}

impl<B: Backend> ExpFamily<B> for Enumerated<B> {
    fn dim(&self) -> usize {
        self.m
    }

    fn device(&self) -> &B::Device {
        &self.device
    }

    fn states(&self) -> &Tensor<B, 2> {
        &self.states
    }
}
