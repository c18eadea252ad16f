//! Single-marginal robust Bellman update: ordering-maximization (§4.5).

use crate::ambiguity::IntervalAmbiguitySet;
use crate::mode::SatisfactionMode;
use crate::scalar::Scalar;

/// Computes `min`/`max over feasible γ of Σ_t γ(t)·values(t)` for a single
/// ambiguity set, per §4.5.
///
/// `values` must be indexed by the *same* target space the set ranges
/// over (`values.len() >= set.num_targets()`); only entries in the set's
/// support are read.
///
/// `scratch` is a reusable buffer of target indices, overwritten by this
/// call; callers running many columns in sequence (e.g. one per thread in
/// the driver's parallel sweep) should pass the same buffer across calls
/// to avoid reallocating a sort buffer per column.
pub fn omax<R: Scalar>(
    values: &[R],
    set: &IntervalAmbiguitySet<'_, R>,
    mode: SatisfactionMode,
    scratch: &mut Vec<usize>,
) -> R {
    scratch.clear();
    scratch.extend(set.support());

    match mode {
        SatisfactionMode::Pessimistic => {
            scratch.sort_unstable_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap());
        }
        SatisfactionMode::Optimistic => {
            scratch.sort_unstable_by(|&a, &b| values[b].partial_cmp(&values[a]).unwrap());
        }
    }

    let mut budget = set.budget();
    let mut total = R::zero();
    for &t in scratch.iter() {
        let l = set.lower(t);
        total = total + l * values[t];
        if budget <= R::zero() {
            continue;
        }
        let g = set.gap(t);
        let take = if budget < g { budget } else { g };
        total = total + take * values[t];
        budget = budget - take;
    }
    total
}
