//! Properties: per-property value initialization and per-iteration
//! post-processing (§4.9). Grounded on `parity::game::Region`'s
//! `FixedBitSet`-backed set for the target/avoid membership tests.

use fixedbitset::FixedBitSet;

use crate::error::{Error, Result};
use crate::scalar::Scalar;

/// A bitset-backed set of flat state indices, used for reachability
/// targets and avoid sets.
#[derive(Debug, Clone)]
pub struct StateSet {
    data: FixedBitSet,
}

impl StateSet {
    /// Builds a set over a universe of `num_states` states from explicit
    /// member indices.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>, num_states: usize) -> Result<Self> {
        let mut data = FixedBitSet::with_capacity(num_states);
        for idx in indices {
            if idx >= num_states {
                return Err(Error::InvalidIndex {
                    index: idx,
                    bound: num_states,
                    context: "StateSet::from_indices",
                });
            }
            data.insert(idx);
        }
        Ok(Self { data })
    }

    pub fn contains(&self, state: usize) -> bool {
        self.data.contains(state)
    }

    pub fn is_empty(&self) -> bool {
        self.data.count_ones(..) == 0
    }

    pub fn len(&self) -> usize {
        self.data.count_ones(..)
    }

    pub fn num_states(&self) -> usize {
        self.data.len()
    }

    pub fn iter(&self) -> fixedbitset::Ones<'_> {
        self.data.ones()
    }

    /// Broadcasts a set over DFA states `F ⊆ Q` to `S × F` over a product
    /// space of `num_states` source states times `q.num_states()` DFA
    /// states (§4.9's `DFAReachability(F,…)`: "as for reachability over
    /// S×Q with G = S×F"), flat product index `s + q_index * num_states`.
    pub fn broadcast_product(&self, num_states: usize) -> Self {
        let mut data = FixedBitSet::with_capacity(num_states * self.data.len());
        for q in self.data.ones() {
            for s in 0..num_states {
                data.insert(s + q * num_states);
            }
        }
        Self { data }
    }
}

/// The horizon / termination shape a property implies: either a fixed
/// iteration count, or convergence by residual.
#[derive(Debug, Clone, Copy)]
pub enum Horizon<R> {
    Finite(usize),
    Infinite { epsilon: R },
}

impl<R: Scalar> Horizon<R> {
    fn validate_infinite(epsilon: R) -> Result<()> {
        if epsilon <= R::zero() {
            return Err(Error::InvalidParameter {
                parameter: "epsilon",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

/// A property selects value initialization and per-iteration
/// post-processing (§4.9). The `FiniteTime*`/`InfiniteTime*` pairs from
/// the original table are collapsed into a single variant parameterized
/// by [`Horizon`], since the two only differ in how the driver decides
/// when to stop, not in the init/post-processing formulas themselves;
/// `ExactTime*` variants stay distinct because their post-processing
/// genuinely differs (no target masking).
pub enum Property<R> {
    Reachability {
        target: StateSet,
        horizon: Horizon<R>,
    },
    ExactTimeReachability {
        target: StateSet,
        horizon: usize,
    },
    ReachAvoid {
        target: StateSet,
        avoid: StateSet,
        horizon: Horizon<R>,
    },
    ExactTimeReachAvoid {
        target: StateSet,
        avoid: StateSet,
        horizon: usize,
    },
    /// Safety is specified via a shifted value function so the robust
    /// reduction direction need not flip (§9): internally `V` ranges over
    /// `[-1, 0]`, and [`Property::finalize_value`] adds 1 back before the
    /// value is reported to callers.
    Safety {
        avoid: StateSet,
        horizon: Horizon<R>,
    },
    Reward {
        reward: Vec<R>,
        discount: R,
        horizon: Horizon<R>,
    },
    ExpectedExitTime {
        avoid: StateSet,
        epsilon: R,
    },
    /// Reachability over the product space `S × Q`; `target` must already
    /// be broadcast to `S × F` via [`StateSet::broadcast_product`].
    DfaReachability {
        target: StateSet,
        horizon: Horizon<R>,
    },
}

impl<R: Scalar> Property<R> {
    pub fn finite_time_reachability(target: StateSet, horizon: usize) -> Result<Self> {
        Self::validate_nonempty(&target)?;
        Ok(Self::Reachability {
            target,
            horizon: Horizon::Finite(horizon),
        })
    }

    pub fn infinite_time_reachability(target: StateSet, epsilon: R) -> Result<Self> {
        Self::validate_nonempty(&target)?;
        Horizon::<R>::validate_infinite(epsilon)?;
        Ok(Self::Reachability {
            target,
            horizon: Horizon::Infinite { epsilon },
        })
    }

    /// `K = 0` is valid and must not be rejected (testable property 10:
    /// `ExactTimeReachability(G, 0)` returns the indicator of `G`).
    pub fn exact_time_reachability(target: StateSet, horizon: usize) -> Result<Self> {
        Self::validate_nonempty(&target)?;
        Ok(Self::ExactTimeReachability { target, horizon })
    }

    pub fn finite_time_reach_avoid(target: StateSet, avoid: StateSet, horizon: usize) -> Result<Self> {
        Self::validate_nonempty(&target)?;
        Ok(Self::ReachAvoid {
            target,
            avoid,
            horizon: Horizon::Finite(horizon),
        })
    }

    pub fn infinite_time_reach_avoid(target: StateSet, avoid: StateSet, epsilon: R) -> Result<Self> {
        Self::validate_nonempty(&target)?;
        Horizon::<R>::validate_infinite(epsilon)?;
        Ok(Self::ReachAvoid {
            target,
            avoid,
            horizon: Horizon::Infinite { epsilon },
        })
    }

    pub fn exact_time_reach_avoid(target: StateSet, avoid: StateSet, horizon: usize) -> Result<Self> {
        Self::validate_nonempty(&target)?;
        Ok(Self::ExactTimeReachAvoid {
            target,
            avoid,
            horizon,
        })
    }

    pub fn finite_time_safety(avoid: StateSet, horizon: usize) -> Self {
        Self::Safety {
            avoid,
            horizon: Horizon::Finite(horizon),
        }
    }

    pub fn infinite_time_safety(avoid: StateSet, epsilon: R) -> Result<Self> {
        Horizon::<R>::validate_infinite(epsilon)?;
        Ok(Self::Safety {
            avoid,
            horizon: Horizon::Infinite { epsilon },
        })
    }

    pub fn finite_time_reward(reward: Vec<R>, discount: R, horizon: usize) -> Result<Self> {
        // finite-horizon reward allows discount == 1 (§4.9).
        if discount <= R::zero() || discount > R::one() {
            return Err(Error::InvalidParameter {
                parameter: "discount",
                reason: "must be in (0, 1] for finite-horizon reward".to_string(),
            });
        }
        Ok(Self::Reward {
            reward,
            discount,
            horizon: Horizon::Finite(horizon),
        })
    }

    pub fn infinite_time_reward(reward: Vec<R>, discount: R, epsilon: R) -> Result<Self> {
        // infinite-horizon reward requires discount < 1 (contraction).
        if discount <= R::zero() || discount >= R::one() {
            return Err(Error::InvalidParameter {
                parameter: "discount",
                reason: "must be in (0, 1) for infinite-horizon reward".to_string(),
            });
        }
        Horizon::<R>::validate_infinite(epsilon)?;
        Ok(Self::Reward {
            reward,
            discount,
            horizon: Horizon::Infinite { epsilon },
        })
    }

    pub fn expected_exit_time(avoid: StateSet, epsilon: R) -> Result<Self> {
        Horizon::<R>::validate_infinite(epsilon)?;
        Ok(Self::ExpectedExitTime { avoid, epsilon })
    }

    pub fn finite_time_dfa_reachability(accepting_product_target: StateSet, horizon: usize) -> Result<Self> {
        Self::validate_nonempty(&accepting_product_target)?;
        Ok(Self::DfaReachability {
            target: accepting_product_target,
            horizon: Horizon::Finite(horizon),
        })
    }

    pub fn infinite_time_dfa_reachability(accepting_product_target: StateSet, epsilon: R) -> Result<Self> {
        Self::validate_nonempty(&accepting_product_target)?;
        Horizon::<R>::validate_infinite(epsilon)?;
        Ok(Self::DfaReachability {
            target: accepting_product_target,
            horizon: Horizon::Infinite { epsilon },
        })
    }

    fn validate_nonempty(target: &StateSet) -> Result<()> {
        if target.is_empty() {
            return Err(Error::InvalidParameter {
                parameter: "target",
                reason: "target set must not be empty for reachability".to_string(),
            });
        }
        Ok(())
    }

    /// `V_0(s)` per the §4.9 table.
    pub fn init_value(&self, num_states: usize) -> Vec<R> {
        match self {
            Self::Reachability { target, .. }
            | Self::ExactTimeReachability { target, .. }
            | Self::ReachAvoid { target, .. }
            | Self::ExactTimeReachAvoid { target, .. }
            | Self::DfaReachability { target, .. } => (0..num_states)
                .map(|s| if target.contains(s) { R::one() } else { R::zero() })
                .collect(),
            Self::Safety { avoid, .. } => (0..num_states)
                .map(|s| if avoid.contains(s) { -R::one() } else { R::zero() })
                .collect(),
            Self::Reward { reward, .. } => reward.clone(),
            Self::ExpectedExitTime { .. } => vec![R::zero(); num_states],
        }
    }

    /// Post-update of the raw Bellman output `b = B(s)` at state `s`,
    /// per the §4.9 table.
    pub fn post_process(&self, state: usize, b: R) -> R {
        match self {
            Self::Reachability { target, .. } | Self::DfaReachability { target, .. } => {
                if target.contains(state) {
                    R::one()
                } else {
                    b
                }
            }
            Self::ExactTimeReachability { .. } => b,
            Self::ReachAvoid { target, avoid, .. } => {
                if target.contains(state) {
                    R::one()
                } else if avoid.contains(state) {
                    R::zero()
                } else {
                    b
                }
            }
            Self::ExactTimeReachAvoid { avoid, .. } => {
                if avoid.contains(state) {
                    R::zero()
                } else {
                    b
                }
            }
            Self::Safety { avoid, .. } => {
                if avoid.contains(state) {
                    -R::one()
                } else {
                    b
                }
            }
            Self::Reward { reward, discount, .. } => reward[state] + *discount * b,
            Self::ExpectedExitTime { avoid, .. } => {
                if avoid.contains(state) {
                    R::zero()
                } else {
                    R::one() + b
                }
            }
        }
    }

    /// Transforms the driver's internal value into the value reported to
    /// callers. Identity for every property except [`Property::Safety`],
    /// which reports `1 + V` to undo its internal shift (§9).
    pub fn finalize_value(&self, v: R) -> R {
        match self {
            Self::Safety { .. } => R::one() + v,
            _ => v,
        }
    }

    /// The termination this property naturally implies: a fixed
    /// iteration count for `FiniteTime*`/`ExactTime*` variants, or
    /// residual convergence for `InfiniteTime*`/`ExpectedExitTime`.
    pub fn horizon(&self) -> Horizon<R> {
        match self {
            Self::Reachability { horizon, .. }
            | Self::ReachAvoid { horizon, .. }
            | Self::Safety { horizon, .. }
            | Self::Reward { horizon, .. }
            | Self::DfaReachability { horizon, .. } => *horizon,
            Self::ExactTimeReachability { horizon, .. } => Horizon::Finite(*horizon),
            Self::ExactTimeReachAvoid { horizon, .. } => Horizon::Finite(*horizon),
            Self::ExpectedExitTime { epsilon, .. } => Horizon::Infinite { epsilon: *epsilon },
        }
    }
}
