//! `Marginal`: an indexing adapter from a factored `(state, action)` pair
//! to a column of an [`IntervalAmbiguitySets`] collection (§4.3).

use crate::ambiguity::{IntervalAmbiguitySet, IntervalAmbiguitySets};
use crate::error::{Error, Result};
use crate::scalar::Scalar;

/// Maps a sub-selection of the global state/action variables to a column
/// index of its backing [`IntervalAmbiguitySets`], via a precomputed
/// column-major linearization (§4.3, §4.3.1).
///
/// Strides are computed once at construction so `get` is O(1) rather than
/// recomputing the linearization on every lookup.
pub struct Marginal<R: Scalar> {
    sets: IntervalAmbiguitySets<R>,
    state_indices: Vec<usize>,
    action_indices: Vec<usize>,
    /// Shapes of the selected state/action variables, in selection order.
    source_dims: Vec<usize>,
    action_vars: Vec<usize>,
    /// Column-major strides over `(source_dims, action_vars)` concatenated,
    /// fastest-varying first.
    strides: Vec<usize>,
}

impl<R: Scalar> Marginal<R> {
    /// Builds a marginal over `sets` selecting `state_indices` out of the
    /// global state shape and `action_indices` out of the global action
    /// shape.
    ///
    /// `source_dims`/`action_vars` give the extents of the selected indices
    /// (i.e. `global_state_shape[state_indices[k]]` and
    /// `global_action_shape[action_indices[k]]`), supplied by the caller
    /// since `Marginal` itself does not retain the global shapes.
    ///
    /// Fails with [`Error::DimensionMismatch`] if
    /// `prod(source_dims) * prod(action_vars) != sets.num_columns()`, or if
    /// `state_indices`/`action_indices` disagree in length with
    /// `source_dims`/`action_vars`.
    pub fn build(
        sets: IntervalAmbiguitySets<R>,
        state_indices: Vec<usize>,
        action_indices: Vec<usize>,
        source_dims: Vec<usize>,
        action_vars: Vec<usize>,
    ) -> Result<Self> {
        if state_indices.len() != source_dims.len() {
            return Err(Error::DimensionMismatch {
                expected: vec![state_indices.len()],
                found: vec![source_dims.len()],
                context: "Marginal::build state_indices/source_dims length",
            });
        }
        if action_indices.len() != action_vars.len() {
            return Err(Error::DimensionMismatch {
                expected: vec![action_indices.len()],
                found: vec![action_vars.len()],
                context: "Marginal::build action_indices/action_vars length",
            });
        }
        let num_columns: usize = source_dims
            .iter()
            .chain(action_vars.iter())
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| Error::InvalidParameter {
                parameter: "source_dims/action_vars",
                reason: "product of dimensions overflows usize".to_string(),
            })?;
        if num_columns != sets.num_columns() {
            return Err(Error::DimensionMismatch {
                expected: vec![num_columns],
                found: vec![sets.num_columns()],
                context: "Marginal::build source_dims/action_vars product vs sets.num_columns()",
            });
        }

        let mut strides = vec![0usize; source_dims.len() + action_vars.len()];
        let mut acc = 1usize;
        for (k, &dim) in source_dims.iter().chain(action_vars.iter()).enumerate() {
            strides[k] = acc;
            acc *= dim;
        }

        Ok(Self {
            sets,
            state_indices,
            action_indices,
            source_dims,
            action_vars,
            strides,
        })
    }

    /// Column-major linear index for the selected coordinates of `state`
    /// and `action`.
    ///
    /// # Panics
    ///
    /// Panics (via the backing `Vec` index) if `state`/`action` are too
    /// short to cover every index in `state_indices`/`action_indices`, or
    /// if a selected coordinate is out of range for its declared extent
    /// (debug builds only check the latter via `validate_indices`; callers
    /// ingesting external data should call [`Marginal::column_index`]'s
    /// fallible twin if that matters — here it is assumed the caller
    /// already validated shapes against the global state/action shape at
    /// [`crate::model::FactoredRMDP::build`] time).
    fn column_index(&self, state: &[usize], action: &[usize]) -> usize {
        let mut idx = 0usize;
        for (k, &var) in self.state_indices.iter().enumerate() {
            idx += state[var] * self.strides[k];
        }
        let offset = self.source_dims.len();
        for (k, &var) in self.action_indices.iter().enumerate() {
            idx += action[var] * self.strides[offset + k];
        }
        idx
    }

    /// Returns the ambiguity set for the given full state/action
    /// multi-indices, selecting out this marginal's `state_indices` /
    /// `action_indices` coordinates.
    pub fn get(&self, state: &[usize], action: &[usize]) -> IntervalAmbiguitySet<'_, R> {
        self.sets.get(self.column_index(state, action))
    }

    /// Number of targets shared by every column of this marginal.
    pub fn num_targets(&self) -> usize {
        self.sets.num_targets()
    }

    /// Largest column support size, for workspace sizing.
    pub fn max_support_size(&self) -> usize {
        self.sets.max_support_size()
    }

    pub fn state_indices(&self) -> &[usize] {
        &self.state_indices
    }

    pub fn action_indices(&self) -> &[usize] {
        &self.action_indices
    }
}
