//! Per-example mutable state shared between a forward and a backward pass.

use burn::prelude::*;

/// Carrier for the two values that survive between calls within one
/// forward/backward cycle: the noise draw of [`perturb_and_map`] and the
/// sampled state consumed by [`score_function_grad`].
///
/// The context is owned by the orchestration layer, which creates one per
/// example and resets it between cycles. The library only ever writes the
/// noise slot; the sample slot is written by the caller after a sampling
/// step and read by the gradient estimator.
///
/// [`perturb_and_map`]: crate::perturb::perturb_and_map
/// [`score_function_grad`]: crate::grad::score_function_grad
pub struct StepContext<B: Backend> {
    noise: Option<Tensor<B, 1>>,
    sample: Option<Tensor<B, 1>>,
}

impl<B: Backend> StepContext<B> {
    /// Create a context with both slots empty.
    pub fn new() -> Self {
        Self {
            noise: None,
            sample: None,
        }
    }

    /// The cached noise vector, if one was stored this cycle.
    pub fn noise(&self) -> Option<&Tensor<B, 1>> {
        self.noise.as_ref()
    }

    /// Store a noise vector for reuse by later perturb-and-MAP calls.
    pub fn set_noise(&mut self, eps: Tensor<B, 1>) {
        self.noise = Some(eps);
    }

    /// The cached forward sample, if the caller stored one.
    pub fn sample(&self) -> Option<&Tensor<B, 1>> {
        self.sample.as_ref()
    }

    /// Store the sampled state so the gradient estimator can read it back.
    pub fn set_sample(&mut self, state: Tensor<B, 1>) {
        self.sample = Some(state);
    }

    /// Empty both slots, ready for the next cycle.
    pub fn clear(&mut self) {
        self.noise = None;
        self.sample = None;
    }
}

impl<B: Backend> Default for StepContext<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArray;
    use burn::tensor::TensorData;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_slots_start_empty() {
        let ctx = StepContext::<TestBackend>::new();
        assert!(ctx.noise().is_none());
        assert!(ctx.sample().is_none());
    }

    #[test]
    fn test_set_and_clear() {
        let device = Default::default();
        let mut ctx = StepContext::<TestBackend>::new();

        let eps = Tensor::<TestBackend, 1>::from_data(TensorData::from([0.3_f32, -0.7]), &device);
        let state = Tensor::<TestBackend, 1>::from_data(TensorData::from([1.0_f32, 0.0]), &device);
        ctx.set_noise(eps);
        ctx.set_sample(state);

        assert_eq!(ctx.noise().unwrap().dims(), [2]);
        assert_eq!(ctx.sample().unwrap().dims(), [2]);

        ctx.clear();
        assert!(ctx.noise().is_none());
        assert!(ctx.sample().is_none());
    }
}
