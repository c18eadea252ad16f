//! Deterministic finite automaton and state labelling, used to build a
//! lazy fRMDP×DFA product for co-safe temporal properties (§3).

use crate::error::{Error, Result};

/// A DFA `(Q, q0, Σ, δ)`. The accepting set `F ⊆ Q` is deliberately not
/// stored here — it lives in the specification (§3: "Accepting states
/// live in the specification, not the DFA"), since the same automaton can
/// back different reachability targets.
pub struct Dfa {
    num_states: usize,
    initial_state: usize,
    alphabet_size: usize,
    /// Flat `|Σ| × |Q|` column-major transition table: `transition[sigma +
    /// q * alphabet_size] == δ(q, sigma)`.
    transition: Vec<usize>,
    /// Names of the atomic propositions backing the alphabet, for
    /// diagnostics only; not consulted by any Bellman kernel.
    atomic_props: Vec<String>,
}

impl Dfa {
    /// Builds a DFA from a `|Σ| × |Q|` transition table (column-major,
    /// `transition[sigma + q * alphabet_size]`), per §6's
    /// `build_dfa(transition_table, initial_state, atomic_props)`.
    pub fn build(
        transition_table: &[usize],
        alphabet_size: usize,
        num_states: usize,
        initial_state: usize,
        atomic_props: Vec<String>,
    ) -> Result<Self> {
        let expected = alphabet_size * num_states;
        if transition_table.len() != expected {
            return Err(Error::DimensionMismatch {
                expected: vec![expected],
                found: vec![transition_table.len()],
                context: "Dfa::build transition_table shape",
            });
        }
        if initial_state >= num_states {
            return Err(Error::InvalidIndex {
                index: initial_state,
                bound: num_states,
                context: "Dfa::build initial_state",
            });
        }
        for &q in transition_table {
            if q >= num_states {
                return Err(Error::InvalidIndex {
                    index: q,
                    bound: num_states,
                    context: "Dfa::build transition_table target state",
                });
            }
        }
        Ok(Self {
            num_states,
            initial_state,
            alphabet_size,
            transition: transition_table.to_vec(),
            atomic_props,
        })
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn initial_state(&self) -> usize {
        self.initial_state
    }

    pub fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    pub fn atomic_props(&self) -> &[String] {
        &self.atomic_props
    }

    /// `δ(q, sigma)`.
    ///
    /// # Panics
    ///
    /// Panics if `q >= num_states()` or `sigma >= alphabet_size()`.
    pub fn delta(&self, q: usize, sigma: usize) -> usize {
        self.transition[sigma + q * self.alphabet_size]
    }
}

/// A total deterministic labelling `L : S → Σ` from fRMDP states to DFA
/// input symbols.
pub struct Labelling {
    labels: Vec<usize>,
}

impl Labelling {
    /// Builds a labelling from an explicit `map` over every flat state
    /// index, per §6's `build_labelling(map)`.
    pub fn build(map: Vec<usize>, alphabet_size: usize) -> Result<Self> {
        for &sigma in &map {
            if sigma >= alphabet_size {
                return Err(Error::InvalidIndex {
                    index: sigma,
                    bound: alphabet_size,
                    context: "Labelling::build map entry",
                });
            }
        }
        Ok(Self { labels: map })
    }

    pub fn label(&self, state: usize) -> usize {
        self.labels[state]
    }

    pub fn num_states(&self) -> usize {
        self.labels.len()
    }
}
