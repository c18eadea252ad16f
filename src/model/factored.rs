//! `FactoredRMDP`: an ordered tuple of marginals sharing global state and
//! action shapes (§3).

use crate::error::{Error, Result};
use crate::model::marginal::Marginal;
use crate::scalar::Scalar;

/// A factored robust MDP: `n` marginals `M_1, …, M_n`, one per state
/// variable, together with the global `state_shape = (S_1, …, S_n)` and
/// `action_shape`. The source state space is `S = S_1 × … × S_n`.
pub struct FactoredRMDP<R: Scalar> {
    marginals: Vec<Marginal<R>>,
    state_shape: Vec<usize>,
    action_shape: Vec<usize>,
}

impl<R: Scalar> FactoredRMDP<R> {
    /// Builds a factored RMDP from `marginals`, validating that each
    /// marginal's declared `state_indices`/`action_indices` stay within
    /// `state_shape`/`action_shape`.
    pub fn build(
        state_shape: Vec<usize>,
        action_shape: Vec<usize>,
        marginals: Vec<Marginal<R>>,
    ) -> Result<Self> {
        if marginals.len() != state_shape.len() {
            return Err(Error::DimensionMismatch {
                expected: vec![state_shape.len()],
                found: vec![marginals.len()],
                context: "FactoredRMDP::build one marginal per state variable",
            });
        }
        for (i, marginal) in marginals.iter().enumerate() {
            if marginal.num_targets() != state_shape[i] {
                return Err(Error::DimensionMismatch {
                    expected: vec![state_shape[i]],
                    found: vec![marginal.num_targets()],
                    context: "FactoredRMDP::build marginal_i.num_targets() vs state_shape[i]",
                });
            }
            for &idx in marginal.state_indices() {
                if idx >= state_shape.len() {
                    return Err(Error::InvalidIndex {
                        index: idx,
                        bound: state_shape.len(),
                        context: "FactoredRMDP::build marginal state_indices",
                    });
                }
            }
            for &idx in marginal.action_indices() {
                if idx >= action_shape.len() {
                    return Err(Error::InvalidIndex {
                        index: idx,
                        bound: action_shape.len(),
                        context: "FactoredRMDP::build marginal action_indices",
                    });
                }
            }
        }
        Ok(Self {
            marginals,
            state_shape,
            action_shape,
        })
    }

    /// The ordered marginals `M_1, …, M_n`.
    pub fn marginals(&self) -> &[Marginal<R>] {
        &self.marginals
    }

    pub fn state_shape(&self) -> &[usize] {
        &self.state_shape
    }

    pub fn action_shape(&self) -> &[usize] {
        &self.action_shape
    }

    /// Total number of joint source states `|S| = prod(state_shape)`.
    pub fn num_states(&self) -> usize {
        self.state_shape.iter().product()
    }

    /// Total number of joint actions `|A| = prod(action_shape)`.
    pub fn num_actions(&self) -> usize {
        self.action_shape.iter().product()
    }

    /// Unravels a flat joint state index into per-variable coordinates,
    /// column-major (variable 0 fastest-varying), matching
    /// [`Marginal`]'s linearization convention.
    pub fn state_coords(&self, mut flat: usize) -> Vec<usize> {
        let mut coords = vec![0usize; self.state_shape.len()];
        for (k, &dim) in self.state_shape.iter().enumerate() {
            coords[k] = flat % dim;
            flat /= dim;
        }
        coords
    }

    /// Unravels a flat joint action index into per-variable coordinates,
    /// using the same convention as [`FactoredRMDP::state_coords`].
    pub fn action_coords(&self, mut flat: usize) -> Vec<usize> {
        let mut coords = vec![0usize; self.action_shape.len()];
        for (k, &dim) in self.action_shape.iter().enumerate() {
            coords[k] = flat % dim;
            flat /= dim;
        }
        coords
    }
}
