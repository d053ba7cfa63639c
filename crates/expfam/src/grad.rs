//! Score-function (REINFORCE) gradient surrogate for the sampling step.

use burn::prelude::*;

use crate::context::StepContext;
use crate::error::FamilyError;
use crate::family::ExpFamily;

/// Substitute marginal estimator, for callers that want a cheaper or
/// approximate `μ(θ)` in place of the exact enumeration-backed marginals.
pub type MarginalFn<B> = Box<dyn Fn(&Tensor<B, 1>) -> Tensor<B, 1> + Send + Sync>;

/// Build the gradient closure `∇_θ log p(z; θ) = z − μ(θ)`.
///
/// The returned closure reads the realized sample `z` from the context; the
/// caller must have stored it there after the forward sampling step. `μ`
/// defaults to [`ExpFamily::marginals`] and can be replaced with `mu`.
///
/// Sampling is not differentiable, so this surrogate stands in for the
/// pathwise gradient: scaled by the downstream loss it is the score-function
/// estimate of the loss gradient with respect to θ.
///
/// # Errors
/// The closure returns [`FamilyError::MissingSample`] when the context has
/// no cached sample.
pub fn score_function_grad<'a, B, F>(
    family: &'a F,
    mu: Option<MarginalFn<B>>,
) -> impl Fn(&Tensor<B, 1>, &StepContext<B>) -> Result<Tensor<B, 1>, FamilyError> + 'a
where
    B: Backend,
    F: ExpFamily<B> + ?Sized,
{
    move |theta, ctx| {
        let sample = ctx.sample().ok_or(FamilyError::MissingSample)?;
        let mu_theta = match &mu {
            Some(f) => f(theta),
            None => family.marginals(theta),
        };
        Ok(sample.clone() - mu_theta)
    }
}
