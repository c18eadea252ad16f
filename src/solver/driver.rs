//! The value-iteration driver (§4.10, §5): allocates `V`/`V'`, initializes
//! from the property, loops Bellman + post-processing + strategy update +
//! termination check, parallel over states.
//!
//! Loop shape grounded on `solve_with`/`explore_with` in `strix`'s
//! `src/lib.rs`: advance state, check termination, produce a result.

use log::{debug, info, trace};
use rayon::prelude::*;

use crate::automaton::product::ProductProcess;
use crate::bellman::factored::factored_bellman;
use crate::bellman::workspace::{FactoredScratch, Workspace};
use crate::error::{Error, Result};
use crate::mode::StrategyMode;
use crate::model::FactoredRMDP;
use crate::scalar::Scalar;
use crate::solver::algorithm::Algorithm;
use crate::solver::options::{Device, IterationOptions, StrategySetting, Termination};
use crate::spec::property::Horizon;
use crate::spec::specification::{Problem, ProblemKind};
use crate::strategy::{StrategyCache, StrategyCacheMode};

/// What [`ValueIterationDriver::solve`] needs from a system to run the
/// per-state Bellman sweep, unifying [`FactoredRMDP`] and [`ProductProcess`]
/// behind one dispatch point. Grounded on `parity::game::Game<'a>`'s
/// `Index`/associated-type trait shape — the same "one small trait, two
/// concrete backends" pattern used for `ambiguity::sets`.
pub trait BellmanSystem<R: Scalar>: Sync {
    fn num_logical_states(&self) -> usize;
    fn num_actions(&self) -> usize;
    fn max_support_size(&self) -> usize;
    fn state_shape_for_scratch(&self) -> Vec<usize>;
    /// Length of the DFA-product relabel buffer; `0` for a plain
    /// [`FactoredRMDP`].
    fn relabel_len(&self) -> usize;
    fn bellman_value(
        &self,
        state: usize,
        action: usize,
        value: &[R],
        mode: crate::mode::SatisfactionMode,
        scratch: &mut FactoredScratch<R>,
    ) -> R;
}

impl<R: Scalar> BellmanSystem<R> for FactoredRMDP<R> {
    fn num_logical_states(&self) -> usize {
        self.num_states()
    }

    fn num_actions(&self) -> usize {
        self.num_actions()
    }

    fn max_support_size(&self) -> usize {
        self.marginals()
            .iter()
            .map(|m| m.max_support_size())
            .max()
            .unwrap_or(0)
    }

    fn state_shape_for_scratch(&self) -> Vec<usize> {
        self.state_shape().to_vec()
    }

    fn relabel_len(&self) -> usize {
        0
    }

    fn bellman_value(
        &self,
        state: usize,
        action: usize,
        value: &[R],
        mode: crate::mode::SatisfactionMode,
        scratch: &mut FactoredScratch<R>,
    ) -> R {
        let s = self.state_coords(state);
        let a = self.action_coords(action);
        factored_bellman(self.marginals(), self.state_shape(), &s, &a, value, mode, scratch)
    }
}

impl<'a, R: Scalar> BellmanSystem<R> for ProductProcess<'a, R> {
    fn num_logical_states(&self) -> usize {
        self.num_product_states()
    }

    fn num_actions(&self) -> usize {
        self.model().num_actions()
    }

    fn max_support_size(&self) -> usize {
        self.model()
            .marginals()
            .iter()
            .map(|m| m.max_support_size())
            .max()
            .unwrap_or(0)
    }

    fn state_shape_for_scratch(&self) -> Vec<usize> {
        self.model().state_shape().to_vec()
    }

    fn relabel_len(&self) -> usize {
        self.num_states()
    }

    fn bellman_value(
        &self,
        state: usize,
        action: usize,
        value: &[R],
        mode: crate::mode::SatisfactionMode,
        scratch: &mut FactoredScratch<R>,
    ) -> R {
        let num_states = self.num_states();
        let flat_state = state % num_states;
        let q = state / num_states;
        let a = self.model().action_coords(action);
        self.bellman_update(flat_state, q, &a, value, mode, scratch)
    }
}

/// The strategy a [`SolveResult`] carries, matching the cache variant the
/// driver was configured with (§4.8).
#[derive(Debug, Clone)]
pub enum StrategyOutput {
    None,
    Stationary(Vec<usize>),
    TimeVarying(Vec<Vec<usize>>),
}

/// The outcome of a completed or cancelled `solve` call (§4.10, §5).
pub struct SolveResult<R> {
    pub value: Vec<R>,
    pub iterations: usize,
    pub residual: R,
    pub strategy: StrategyOutput,
}

/// Either a normal completion, or an early return triggered by the
/// cancellation hook (§5). `Cancelled` still carries a usable partial
/// value function, per §5's cancellation contract, so it is modeled as a
/// success-shaped variant rather than an [`Error`].
pub enum SolveOutcome<R> {
    Converged(SolveResult<R>),
    Cancelled(Box<SolveResult<R>>),
}

/// Runs robust value iteration for a [`Problem`] (§4.10).
pub struct ValueIterationDriver;

impl ValueIterationDriver {
    /// Runs the driver for the given `algorithm` (§6, §6.1). Only
    /// [`Algorithm::OMaximization`] has a body in this crate;
    /// `VertexEnumeration` and `LpMcCormickRelaxation` are accepted by this
    /// dispatch (they type-check and match) but are rejected at call time
    /// with [`Error::InvalidParameter`], since this crate defines only their
    /// [`crate::solver::algorithm::BellmanKernel`] interface, not their
    /// internals (§1).
    pub fn solve<S, R>(
        problem: &Problem<'_, S, R>,
        algorithm: Algorithm<R>,
        options: IterationOptions<R>,
    ) -> Result<SolveOutcome<R>>
    where
        S: BellmanSystem<R>,
        R: Scalar,
    {
        match algorithm {
            Algorithm::OMaximization => {}
            Algorithm::VertexEnumeration => {
                return Err(Error::InvalidParameter {
                    parameter: "algorithm",
                    reason: "vertex-enumeration Bellman has no implementation in this crate; \
                             only its BellmanKernel interface is defined (see solver::algorithm)"
                        .to_string(),
                });
            }
            Algorithm::LpMcCormickRelaxation(_) => {
                return Err(Error::InvalidParameter {
                    parameter: "algorithm",
                    reason: "McCormick-relaxation LP Bellman has no implementation in this \
                             crate; only its BellmanKernel interface is defined (see \
                             solver::algorithm)"
                        .to_string(),
                });
            }
        }

        if options.device == Device::Gpu {
            return Err(Error::InvalidParameter {
                parameter: "device",
                reason: "no GPU Bellman kernel is implemented by this crate".to_string(),
            });
        }

        let system = problem.system();
        let specification = problem.specification();
        let property = specification.property();
        let satisfaction_mode = specification.satisfaction_mode();
        let strategy_mode = specification.strategy_mode();

        let num_states = system.num_logical_states();
        let num_actions = system.num_actions();

        let termination = options.termination_override.unwrap_or_else(|| match property.horizon() {
            Horizon::Finite(k) => Termination::FixedIterations(k),
            Horizon::Infinite { epsilon } => Termination::Convergence(epsilon),
        });

        // A control-synthesis problem implies a strategy is wanted even if
        // the caller left `strategy` at its default.
        let strategy_setting = match (problem.kind(), &options.strategy) {
            (ProblemKind::ControlSynthesis, StrategySetting::None) => StrategySetting::Stationary,
            (_, other) => other.clone(),
        };
        let cache_mode = match &strategy_setting {
            StrategySetting::None | StrategySetting::Given(_) => StrategyCacheMode::None,
            StrategySetting::Stationary => StrategyCacheMode::Stationary,
            StrategySetting::TimeVarying => StrategyCacheMode::TimeVarying,
        };
        let mut strategy_cache = StrategyCache::new(cache_mode, num_states);

        let threads = options.threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|err| Error::InvalidParameter {
                parameter: "threads",
                reason: err.to_string(),
            })?;

        let workspace = Workspace::new(
            threads,
            system.max_support_size(),
            num_actions,
            &system.state_shape_for_scratch(),
            system.relabel_len(),
        );

        let mut value = property.init_value(num_states);
        let mut next_value = vec![R::zero(); num_states];
        let mut actions_buf = vec![0usize; num_states];

        let mut iterations = 0usize;
        let mut residual = R::zero();
        let mut cancelled = false;

        info!(
            "starting value iteration: {} states, {} actions, {} threads",
            num_states, num_actions, threads
        );

        loop {
            if let Some(cancel) = &options.cancellation {
                if cancel() {
                    info!("value iteration cancelled after {iterations} iterations");
                    cancelled = true;
                    break;
                }
            }

            let should_stop = match termination {
                Termination::FixedIterations(k) => iterations >= k,
                Termination::Convergence(epsilon) => iterations > 0 && residual < epsilon,
            };
            if should_stop {
                debug!("value iteration converged after {iterations} iterations, residual {residual}");
                break;
            }
            if matches!(termination, Termination::Convergence(_)) && iterations >= options.max_iterations {
                return Err(Error::IterationLimitExceeded { iterations });
            }

            pool.install(|| {
                next_value
                    .par_iter_mut()
                    .zip(actions_buf.par_iter_mut())
                    .enumerate()
                    .for_each(|(state, (slot, action_slot))| {
                        let tid = rayon::current_thread_index().unwrap_or(0);
                        let mut scratch = workspace.factored_scratch_for(tid);

                        let (chosen, action) = match &strategy_setting {
                            StrategySetting::Given(policy) => {
                                let action = policy[state];
                                let b = system.bellman_value(
                                    state,
                                    action,
                                    &value,
                                    satisfaction_mode,
                                    &mut scratch,
                                );
                                (b, action)
                            }
                            _ => {
                                let mut best: Option<R> = None;
                                let mut best_action = 0usize;
                                for action in 0..num_actions {
                                    let b = system.bellman_value(
                                        state,
                                        action,
                                        &value,
                                        satisfaction_mode,
                                        &mut scratch,
                                    );
                                    let better = match best {
                                        None => true,
                                        Some(cur) => match strategy_mode {
                                            StrategyMode::Maximize => b > cur,
                                            StrategyMode::Minimize => b < cur,
                                        },
                                    };
                                    if better {
                                        best = Some(b);
                                        best_action = action;
                                    }
                                }
                                (best.unwrap_or_else(R::zero), best_action)
                            }
                        };

                        *slot = property.post_process(state, chosen);
                        *action_slot = action;
                    });
            });

            residual = (0..num_states)
                .map(|s| (next_value[s] - value[s]).abs())
                .fold(R::zero(), |acc, d| if d > acc { d } else { acc });

            std::mem::swap(&mut value, &mut next_value);
            iterations += 1;
            trace!("iteration {iterations}: residual {residual}");

            match cache_mode {
                StrategyCacheMode::None => {}
                StrategyCacheMode::Stationary => strategy_cache.overwrite_stationary(&actions_buf),
                StrategyCacheMode::TimeVarying => strategy_cache.push_time_varying_step(&actions_buf),
            }
        }

        let final_value: Vec<R> = value.iter().map(|&v| property.finalize_value(v)).collect();
        let strategy = match cache_mode {
            StrategyCacheMode::None => match &strategy_setting {
                StrategySetting::Given(policy) => StrategyOutput::Stationary(policy.clone()),
                _ => StrategyOutput::None,
            },
            StrategyCacheMode::Stationary => {
                StrategyOutput::Stationary(strategy_cache.stationary().unwrap().to_vec())
            }
            StrategyCacheMode::TimeVarying => {
                StrategyOutput::TimeVarying(strategy_cache.time_varying().unwrap().to_vec())
            }
        };

        let result = SolveResult {
            value: final_value,
            iterations,
            residual,
            strategy,
        };

        if cancelled {
            Ok(SolveOutcome::Cancelled(Box::new(result)))
        } else {
            Ok(SolveOutcome::Converged(result))
        }
    }
}
