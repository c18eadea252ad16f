//! `frmdp-core`: robust value iteration and strategy synthesis for factored
//! interval Markov decision processes (§1).
//!
//! A factored robust MDP ([`model::FactoredRMDP`]) couples `n` marginal
//! processes, each carrying interval ambiguity sets ([`ambiguity`]) over a
//! single state variable's transition targets. The robust Bellman operator
//! ([`bellman`]) peels these marginals one at a time (§4.6) using
//! ordering-based O-maximization (§4.5) as its per-column kernel.
//! Co-safe temporal properties are handled by lazily pairing the model with
//! a DFA ([`automaton`]) rather than materializing a product transition
//! table. [`spec`] describes what to solve for; [`solver`] runs it.
//!
//! ```text
//! let model = FactoredRMDP::build(state_shape, action_shape, marginals)?;
//! let target = StateSet::from_indices([3, 4], model.num_states())?;
//! let property = Property::finite_time_reachability(target, 20)?;
//! let specification = Specification::build(
//!     property, SatisfactionMode::Pessimistic, StrategyMode::Maximize,
//! );
//! let problem = Problem::verification(&model, specification);
//! let outcome = ValueIterationDriver::solve(&problem, Algorithm::OMaximization, IterationOptions::default())?;
//! ```

pub mod ambiguity;
pub mod automaton;
pub mod bellman;
pub mod error;
pub mod mode;
pub mod model;
pub mod scalar;
pub mod solver;
pub mod spec;
pub mod strategy;

pub use error::{Error, Result};
pub use mode::{SatisfactionMode, StrategyMode};
pub use scalar::Scalar;
