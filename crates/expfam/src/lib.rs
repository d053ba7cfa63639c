//! Discrete exponential-family random variables over constrained supports.
//!
//! Models distributions of the form `p(s) ∝ exp(<s, θ>)` where `s` ranges over
//! a finite set of binary state vectors (the shipped specialization: all
//! k-element subsets of m coordinates). Provides exact pmf/marginals, faithful
//! sampling, MAP, a perturb-and-MAP relaxation, and a score-function
//! (REINFORCE) gradient surrogate, so the variable can act as a stochastic
//! layer inside a gradient-based pipeline.

pub mod bridge;
pub mod context;
pub mod error;
pub mod family;
pub mod grad;
pub mod perturb;
pub mod topk;

pub use context::StepContext;
pub use error::FamilyError;
pub use family::{Enumerated, ExpFamily};
pub use grad::{score_function_grad, MarginalFn};
pub use perturb::{gumbel, perturb_and_map};
pub use topk::{TopK, TopKConfig};
