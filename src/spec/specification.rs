//! `Specification` and the verification / control-synthesis problem
//! builders (§6, §4.9).

use crate::mode::{SatisfactionMode, StrategyMode};
use crate::scalar::Scalar;
use crate::spec::property::Property;

/// A property together with the two binary mode choices that parameterize
/// every robust Bellman update (§3).
pub struct Specification<R: Scalar> {
    property: Property<R>,
    satisfaction_mode: SatisfactionMode,
    strategy_mode: StrategyMode,
}

impl<R: Scalar> Specification<R> {
    /// Per §6's `make_specification(property, satisfaction_mode,
    /// strategy_mode)`.
    pub fn build(
        property: Property<R>,
        satisfaction_mode: SatisfactionMode,
        strategy_mode: StrategyMode,
    ) -> Self {
        Self {
            property,
            satisfaction_mode,
            strategy_mode,
        }
    }

    pub fn property(&self) -> &Property<R> {
        &self.property
    }

    pub fn satisfaction_mode(&self) -> SatisfactionMode {
        self.satisfaction_mode
    }

    pub fn strategy_mode(&self) -> StrategyMode {
        self.strategy_mode
    }
}

/// Whether a [`Problem`] asks only for the value function (`Verification`)
/// or additionally wants a control strategy (`ControlSynthesis`), per §6's
/// `make_verification_problem`/`make_control_synthesis_problem`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemKind {
    Verification,
    ControlSynthesis,
}

/// A system (borrowed, per §9: "a problem borrows its system") paired
/// with a specification and a declared intent.
pub struct Problem<'a, S, R: Scalar> {
    system: &'a S,
    specification: Specification<R>,
    kind: ProblemKind,
}

impl<'a, S, R: Scalar> Problem<'a, S, R> {
    pub fn verification(system: &'a S, specification: Specification<R>) -> Self {
        Self {
            system,
            specification,
            kind: ProblemKind::Verification,
        }
    }

    pub fn control_synthesis(system: &'a S, specification: Specification<R>) -> Self {
        Self {
            system,
            specification,
            kind: ProblemKind::ControlSynthesis,
        }
    }

    pub fn system(&self) -> &'a S {
        self.system
    }

    pub fn specification(&self) -> &Specification<R> {
        &self.specification
    }

    pub fn kind(&self) -> ProblemKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::property::{Property, StateSet};

    #[test]
    fn test_problem_kind_distinguishes_intent() {
        let target = StateSet::from_indices([0], 2).unwrap();
        let property = Property::<f64>::finite_time_reachability(target, 1).unwrap();
        let spec = Specification::build(
            property,
            SatisfactionMode::Pessimistic,
            StrategyMode::Maximize,
        );
        let system = 42i32; // any Sync type stands in for a system here
        let problem = Problem::control_synthesis(&system, spec);
        assert_eq!(problem.kind(), ProblemKind::ControlSynthesis);
        assert_eq!(*problem.system(), 42);
    }
}
