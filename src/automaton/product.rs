//! Lazy fRMDP×DFA product for co-safe temporal properties (§4.7).
//!
//! The product's logical state space is `S × Q`, but no product transition
//! table is ever materialized (original Non-goal: "does not build the
//! DFA×MDP product explicitly"): the DFA step is a pointwise relabelling
//! lookup and the MDP step reuses [`crate::bellman::factored_bellman`]
//! unchanged, the same lazy-pairing shape `constructor::GameConstructor`
//! uses to grow a parity game from an LTL automaton node by node.

use crate::automaton::dfa::{Dfa, Labelling};
use crate::bellman::factored::factored_bellman;
use crate::bellman::workspace::FactoredScratch;
use crate::error::{Error, Result};
use crate::mode::SatisfactionMode;
use crate::model::FactoredRMDP;
use crate::scalar::Scalar;

/// Pairs a [`FactoredRMDP`] with a [`Dfa`] and a [`Labelling`], borrowing
/// the system it pairs (§9: "a problem borrows its system").
pub struct ProductProcess<'a, R: Scalar> {
    model: &'a FactoredRMDP<R>,
    dfa: Dfa,
    labelling: Labelling,
}

impl<'a, R: Scalar> ProductProcess<'a, R> {
    /// Builds a product process, per §6's `build_product_process(rmdp,
    /// dfa, labelling)`. Fails if the labelling does not cover every
    /// joint state of `model`.
    pub fn build(model: &'a FactoredRMDP<R>, dfa: Dfa, labelling: Labelling) -> Result<Self> {
        if labelling.num_states() != model.num_states() {
            return Err(Error::DimensionMismatch {
                expected: vec![model.num_states()],
                found: vec![labelling.num_states()],
                context: "ProductProcess::build labelling coverage vs model.num_states()",
            });
        }
        Ok(Self {
            model,
            dfa,
            labelling,
        })
    }

    pub fn model(&self) -> &FactoredRMDP<R> {
        self.model
    }

    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    pub fn labelling(&self) -> &Labelling {
        &self.labelling
    }

    /// Number of joint source states `|S|`.
    pub fn num_states(&self) -> usize {
        self.model.num_states()
    }

    /// Number of DFA states `|Q|`.
    pub fn num_dfa_states(&self) -> usize {
        self.dfa.num_states()
    }

    /// Total product state count `|S| * |Q|`.
    pub fn num_product_states(&self) -> usize {
        self.num_states() * self.num_dfa_states()
    }

    /// Flat product-state index for `(flat_state, q)`, `flat_state`
    /// fastest-varying — matches the convention value vectors use
    /// throughout the driver.
    pub fn product_index(&self, flat_state: usize, q: usize) -> usize {
        flat_state + q * self.num_states()
    }

    /// Computes the joint Bellman update for `(flat_state, q)` under
    /// `action`, per §4.7:
    ///
    /// ```text
    /// W(t, q) := V(t, δ(q, L(t)))
    /// V'(s, q) := Bellman_M(s, W(·, q))
    /// ```
    ///
    /// `value` is the full product value vector (length
    /// `num_product_states()`, indexed via [`ProductProcess::product_index`]).
    /// Uses `scratch.relabel_buf` (sized to `num_states()` via
    /// [`FactoredScratch::with_relabel`]) to hold `W(·, q)`.
    pub fn bellman_update(
        &self,
        flat_state: usize,
        q: usize,
        action: &[usize],
        value: &[R],
        mode: SatisfactionMode,
        scratch: &mut FactoredScratch<R>,
    ) -> R {
        let num_states = self.num_states();
        scratch.relabel_buf.clear();
        scratch.relabel_buf.resize(num_states, R::zero());
        for t in 0..num_states {
            let sigma = self.labelling.label(t);
            let q_next = self.dfa.delta(q, sigma);
            scratch.relabel_buf[t] = value[self.product_index(t, q_next)];
        }
        let state = self.model.state_coords(flat_state);
        let relabelled = std::mem::take(&mut scratch.relabel_buf);
        let result = factored_bellman(
            self.model.marginals(),
            self.model.state_shape(),
            &state,
            action,
            &relabelled,
            mode,
            scratch,
        );
        scratch.relabel_buf = relabelled;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambiguity::IntervalAmbiguitySets;
    use crate::model::Marginal;

    fn build_s1_like_model() -> FactoredRMDP<f64> {
        // single state variable of extent 3, one action variable of extent 1
        // (absorbing-friendly toy system; exact values don't matter here,
        // only that the product machinery composes correctly).
        let lower = vec![0.0, 0.1, 0.2];
        let upper = vec![0.5, 0.6, 0.7];
        let sets = IntervalAmbiguitySets::from_dense(&lower, &upper, 3, 1).unwrap();
        let marginal = Marginal::build(sets, vec![0], vec![], vec![3], vec![]).unwrap();
        FactoredRMDP::build(vec![3], vec![1], vec![marginal]).unwrap()
    }

    #[test]
    fn test_product_index_and_relabel_lookup() {
        let model = build_s1_like_model();
        let table = vec![0, 1, 2, 1, 2, 2]; // |Sigma|=3,|Q|=2 (not used by delta directly here)
        let dfa = Dfa::build(&table, 3, 2, 0, vec![]).unwrap();
        let labelling = Labelling::build(vec![0, 1, 2], 3).unwrap();
        let product = ProductProcess::build(&model, dfa, labelling).unwrap();

        assert_eq!(product.num_product_states(), 6);
        assert_eq!(product.product_index(0, 0), 0);
        assert_eq!(product.product_index(2, 1), 5);
    }

    #[test]
    fn test_bellman_update_runs_without_panicking() {
        let model = build_s1_like_model();
        let table = vec![0, 1, 1, 1, 1, 1, 1, 1, 1]; // |Sigma|=3, |Q|=3
        let dfa = Dfa::build(&table, 3, 3, 0, vec![]).unwrap();
        let labelling = Labelling::build(vec![0, 1, 2], 3).unwrap();
        let product = ProductProcess::build(&model, dfa, labelling).unwrap();

        let value = vec![0.0; product.num_product_states()];
        let mut scratch = FactoredScratch::with_relabel(model.state_shape(), model.num_states());
        let result = product.bellman_update(
            0,
            0,
            &[0],
            &value,
            SatisfactionMode::Pessimistic,
            &mut scratch,
        );
        assert_eq!(result, 0.0);
    }
}
