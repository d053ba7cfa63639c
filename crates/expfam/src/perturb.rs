//! Perturb-and-MAP: a stochastic relaxation of MAP via additive noise.

use burn::prelude::*;
use rand::Rng;

use crate::bridge::vec_to_tensor;
use crate::context::StepContext;
use crate::family::ExpFamily;

/// Build a perturb-and-MAP closure over `family`.
///
/// Each call perturbs θ with one scalar draw from `noise` per coordinate and
/// returns `map(θ + ε)` through whichever MAP the family provides. When a
/// [`StepContext`] is passed, a cached noise vector is reused instead of
/// redrawing, and a fresh draw is stored for the rest of the cycle, so a
/// forward pass and its backward-side recomputation see the same
/// perturbation. Without a context every call draws fresh noise.
///
/// The noise distribution is the caller's choice; [`gumbel`] builds the
/// canonical one.
pub fn perturb_and_map<'a, B, F, N>(
    family: &'a F,
    mut noise: N,
) -> impl FnMut(&Tensor<B, 1>, Option<&mut StepContext<B>>) -> Tensor<B, 1> + 'a
where
    B: Backend,
    F: ExpFamily<B> + ?Sized,
    N: FnMut() -> f32 + 'a,
{
    move |theta, ctx| {
        let eps = match ctx {
            Some(ctx) => match ctx.noise() {
                Some(eps) => eps.clone(),
                None => {
                    let eps = noise_vector(family, &mut noise);
                    ctx.set_noise(eps.clone());
                    eps
                }
            },
            None => noise_vector(family, &mut noise),
        };
        family.map(&(theta.clone() + eps))
    }
}

/// Standard Gumbel noise source: `-ln(-ln(u))` over clamped uniforms.
pub fn gumbel<R: Rng>(mut rng: R) -> impl FnMut() -> f32 {
    move || {
        let u: f64 = rng.gen_range(0.0..1.0);
        // Clamp away from 0 and 1 to keep both logs finite.
        let u = u.clamp(1e-10, 1.0 - 1e-10);
        (-(-u.ln()).ln()) as f32
    }
}

fn noise_vector<B, F, N>(family: &F, noise: &mut N) -> Tensor<B, 1>
where
    B: Backend,
    F: ExpFamily<B> + ?Sized,
    N: FnMut() -> f32,
{
    let draws: Vec<f32> = (0..family.dim()).map(|_| noise()).collect();
    vec_to_tensor(draws, family.device())
}
