//! Algorithm dispatch tag and the plugin trait non-`OMaximization`
//! algorithms implement (§6, §6.1).
//!
//! Only `OMaximization` is implemented by this crate;
//! [`crate::solver::driver::ValueIterationDriver::solve`] matches on
//! `VertexEnumeration` and `LpMcCormickRelaxation` and rejects both with
//! `Error::InvalidParameter`, since neither carries a body beyond the
//! [`BellmanKernel`] trait they plug into — matching §1's explicit Non-goal
//! that "LP-based Bellman variants... the *interface* they plug into is
//! defined, but their internals are not."

use crate::ambiguity::IntervalAmbiguitySet;
use crate::bellman::omax::omax;
use crate::mode::SatisfactionMode;
use crate::scalar::Scalar;

/// The per-column contract every Bellman algorithm must satisfy (§4.5):
/// given the current value vector and one column's ambiguity set, return
/// the pessimistic/optimistic extreme of `<V, γ>` over the feasible γ.
pub trait BellmanKernel<R: Scalar>: Send + Sync {
    fn omax(&self, values: &[R], set: &IntervalAmbiguitySet<'_, R>, mode: SatisfactionMode) -> R;
}

/// The only algorithm this crate implements the body of: ordering-based
/// maximization (§4.5).
pub struct OMaximizationKernel;

impl<R: Scalar> BellmanKernel<R> for OMaximizationKernel {
    fn omax(&self, values: &[R], set: &IntervalAmbiguitySet<'_, R>, mode: SatisfactionMode) -> R {
        let mut scratch = Vec::with_capacity(set.support_size());
        omax(values, set, mode, &mut scratch)
    }
}

/// Which algorithm a [`crate::solver::driver::ValueIterationDriver`]
/// dispatches to for its per-column Bellman kernel.
pub enum Algorithm<R: Scalar> {
    /// §4.5/§4.6, implemented by this crate.
    OMaximization,
    /// Exact vertex-enumeration Bellman, external plugin only (§1, §6).
    VertexEnumeration,
    /// McCormick-relaxation LP Bellman, external plugin only (§1, §6).
    LpMcCormickRelaxation(Box<dyn BellmanKernel<R>>),
}
