//! Error type shared across the crate.

#[derive(Debug, thiserror::Error)]
pub enum FamilyError {
    /// The subset-size constraint is outside `1..=m`.
    #[error("invalid constraint: expected 1 <= k <= m, got k={k} with m={m}")]
    InvalidConstraint { k: usize, m: usize },

    /// The gradient estimator was called before a forward sample was stored
    /// on the step context.
    #[error("no cached sample on the context; store the forward sample with StepContext::set_sample first")]
    MissingSample,
}
