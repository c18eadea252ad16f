//! End-to-end tests running the full pipeline (model construction → driver)
//! against small, hand-verifiable interval MDPs.

use frmdp_core::ambiguity::IntervalAmbiguitySets;
use frmdp_core::automaton::{Dfa, Labelling, ProductProcess};
use frmdp_core::mode::{SatisfactionMode, StrategyMode};
use frmdp_core::model::{FactoredRMDP, Marginal};
use frmdp_core::solver::{
    Algorithm, Device, IterationOptions, OMaximizationKernel, SolveOutcome, StrategySetting,
    ValueIterationDriver,
};
use frmdp_core::spec::{Problem, Property, Specification, StateSet};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A three-state interval MDP: states 1 and 2 each have two actions with
/// genuine transition-probability ambiguity; state 3 is absorbing.
fn three_state_model() -> FactoredRMDP<f64> {
    // columns ordered (state + 3*action): (s0,a0) (s1,a0) (s2,a0) (s0,a1) (s1,a1) (s2,a1)
    let lower = vec![
        0.0, 0.1, 0.2, // (s0,a0)
        0.1, 0.2, 0.3, // (s1,a0)
        0.0, 0.0, 1.0, // (s2,a0) absorbing
        0.5, 0.3, 0.1, // (s0,a1)
        0.2, 0.3, 0.4, // (s1,a1)
        0.0, 0.0, 1.0, // (s2,a1) absorbing
    ];
    let upper = vec![
        0.5, 0.6, 0.7, // (s0,a0)
        0.6, 0.5, 0.4, // (s1,a0)
        0.0, 0.0, 1.0, // (s2,a0)
        0.7, 0.5, 0.3, // (s0,a1)
        0.6, 0.5, 0.4, // (s1,a1)
        0.0, 0.0, 1.0, // (s2,a1)
    ];
    let sets = IntervalAmbiguitySets::from_dense(&lower, &upper, 3, 6).unwrap();
    let marginal = Marginal::build(sets, vec![0], vec![0], vec![3], vec![2]).unwrap();
    FactoredRMDP::build(vec![3], vec![2], vec![marginal]).unwrap()
}

#[test]
fn three_state_reachability_one_step() {
    init_logging();
    let model = three_state_model();
    let target = StateSet::from_indices([2], model.num_states()).unwrap();
    let property = Property::<f64>::finite_time_reachability(target, 1).unwrap();
    let specification = Specification::build(
        property,
        SatisfactionMode::Pessimistic,
        StrategyMode::Maximize,
    );
    let problem = Problem::verification(&model, specification);
    let options = IterationOptions::default().with_strategy(StrategySetting::Stationary);
    let outcome = ValueIterationDriver::solve(&problem, Algorithm::OMaximization, options).unwrap();

    let result = match outcome {
        SolveOutcome::Converged(r) => r,
        SolveOutcome::Cancelled(_) => panic!("run was not cancelled"),
    };

    // State 3 is the target itself, forced to 1 by post-processing.
    assert_eq!(result.value[2], 1.0);
    // States 1 and 2 each have a genuine best worst-case action; the
    // guaranteed probability of reaching state 3 in one step is the
    // largest lower bound any single action can put on the target
    // column (each column's lower+gap on the target row pins the
    // minimum achievable mass there).
    assert!((result.value[0] - 0.2).abs() < 1e-9);
    assert!((result.value[1] - 0.4).abs() < 1e-9);
}

#[test]
fn three_state_safety_one_step_shifts_and_unshifts() {
    init_logging();
    let model = three_state_model();
    let avoid = StateSet::from_indices([2], model.num_states()).unwrap();
    let property = Property::<f64>::finite_time_safety(avoid, 1);
    let specification = Specification::build(
        property,
        SatisfactionMode::Pessimistic,
        StrategyMode::Minimize,
    );
    let problem = Problem::verification(&model, specification);
    let outcome = ValueIterationDriver::solve(
        &problem,
        Algorithm::OMaximization,
        IterationOptions::default(),
    )
    .unwrap();

    let result = match outcome {
        SolveOutcome::Converged(r) => r,
        SolveOutcome::Cancelled(_) => panic!("run was not cancelled"),
    };

    // Reported values are post-`finalize_value` (1 + internal shift), so
    // they read as "probability of avoiding the bad state", in [0, 1].
    assert!((result.value[0] - 0.3).abs() < 1e-9);
    assert_eq!(result.value[2], 0.0);
    for v in &result.value {
        assert!(*v >= -1e-9 && *v <= 1.0 + 1e-9);
    }
}

#[test]
fn two_state_discounted_reward_one_step() {
    init_logging();
    // A two-state chain with a single action; columns sum exactly to 1
    // at the lower bound, so there is no ambiguity to resolve and the
    // expected value is pinned down exactly by the lower bounds.
    let lower = vec![0.4, 0.6, 0.3, 0.7]; // col0=(s0): [.4,.6]; col1=(s1): [.3,.7]
    let upper = vec![0.5, 0.7, 0.5, 0.7];
    let sets = IntervalAmbiguitySets::from_dense(&lower, &upper, 2, 2).unwrap();
    let marginal = Marginal::build(sets, vec![0], vec![], vec![2], vec![]).unwrap();
    let model = FactoredRMDP::build(vec![2], vec![1], vec![marginal]).unwrap();

    let property = Property::<f64>::finite_time_reward(vec![1.0, 0.0], 0.9, 1).unwrap();
    let specification = Specification::build(
        property,
        SatisfactionMode::Pessimistic,
        StrategyMode::Maximize,
    );
    let problem = Problem::verification(&model, specification);
    let outcome = ValueIterationDriver::solve(
        &problem,
        Algorithm::OMaximization,
        IterationOptions::default(),
    )
    .unwrap();

    let result = match outcome {
        SolveOutcome::Converged(r) => r,
        SolveOutcome::Cancelled(_) => panic!("run was not cancelled"),
    };

    assert!((result.value[0] - 1.36).abs() < 1e-9);
    assert!((result.value[1] - 0.27).abs() < 1e-9);
}

#[test]
fn dfa_product_reachability_matches_relabelled_bellman() {
    init_logging();
    // A DFA with two states, where state 1 is already accepting and
    // state 0 unconditionally transitions to state 1 on the model's one
    // label. The relabelled value at every (t, 0) is therefore 1 after
    // a single Bellman sweep, regardless of the base model's dynamics.
    let model = three_state_model();
    let table = vec![1, 1]; // |Sigma| = 1, |Q| = 2: delta(0,0)=1, delta(1,0)=1
    let dfa = Dfa::build(&table, 1, 2, 0, vec!["l".to_string()]).unwrap();
    let labelling = Labelling::build(vec![0, 0, 0], 1).unwrap();
    let product = ProductProcess::build(&model, dfa, labelling).unwrap();

    let accepting = StateSet::from_indices([1], 2).unwrap();
    let target = accepting.broadcast_product(product.num_states());
    let property = Property::<f64>::finite_time_dfa_reachability(target, 1).unwrap();
    let specification = Specification::build(
        property,
        SatisfactionMode::Pessimistic,
        StrategyMode::Maximize,
    );
    let problem = Problem::verification(&product, specification);
    let outcome = ValueIterationDriver::solve(
        &problem,
        Algorithm::OMaximization,
        IterationOptions::default(),
    )
    .unwrap();

    let result = match outcome {
        SolveOutcome::Converged(r) => r,
        SolveOutcome::Cancelled(_) => panic!("run was not cancelled"),
    };
    for v in &result.value {
        assert!((*v - 1.0).abs() < 1e-9);
    }
}

#[test]
fn parallel_runs_are_deterministic_across_thread_counts() {
    init_logging();
    let model = three_state_model();
    let mut previous: Option<(Vec<f64>, Vec<usize>)> = None;

    for &threads in &[1usize, 2, 4, 8] {
        let target = StateSet::from_indices([2], model.num_states()).unwrap();
        let property = Property::<f64>::finite_time_reachability(target, 50).unwrap();
        let specification = Specification::build(
            property,
            SatisfactionMode::Pessimistic,
            StrategyMode::Maximize,
        );
        let problem = Problem::verification(&model, specification);
        let options = IterationOptions::default()
            .with_threads(threads)
            .with_strategy(StrategySetting::Stationary);
        let outcome =
            ValueIterationDriver::solve(&problem, Algorithm::OMaximization, options).unwrap();
        let result = match outcome {
            SolveOutcome::Converged(r) => r,
            SolveOutcome::Cancelled(_) => panic!("run was not cancelled"),
        };
        let strategy = match result.strategy {
            frmdp_core::solver::StrategyOutput::Stationary(s) => s,
            _ => panic!("expected a stationary strategy"),
        };

        if let Some((prev_value, prev_strategy)) = &previous {
            assert_eq!(prev_value, &result.value, "thread count {threads} diverged in value");
            assert_eq!(
                prev_strategy, &strategy,
                "thread count {threads} diverged in strategy"
            );
        }
        previous = Some((result.value, strategy));
    }
}

#[test]
fn exact_time_zero_horizon_returns_target_indicator() {
    init_logging();
    let model = three_state_model();
    let target = StateSet::from_indices([2], model.num_states()).unwrap();
    let property = Property::<f64>::exact_time_reachability(target, 0).unwrap();
    let specification = Specification::build(
        property,
        SatisfactionMode::Pessimistic,
        StrategyMode::Maximize,
    );
    let problem = Problem::verification(&model, specification);
    let outcome = ValueIterationDriver::solve(
        &problem,
        Algorithm::OMaximization,
        IterationOptions::default(),
    )
    .unwrap();
    let result = match outcome {
        SolveOutcome::Converged(r) => r,
        SolveOutcome::Cancelled(_) => panic!("run was not cancelled"),
    };
    assert_eq!(result.value, vec![0.0, 0.0, 1.0]);
    assert_eq!(result.iterations, 0);
}

#[test]
fn gpu_device_is_rejected_since_no_gpu_kernel_exists() {
    init_logging();
    let model = three_state_model();
    let target = StateSet::from_indices([2], model.num_states()).unwrap();
    let property = Property::<f64>::finite_time_reachability(target, 1).unwrap();
    let specification = Specification::build(
        property,
        SatisfactionMode::Pessimistic,
        StrategyMode::Maximize,
    );
    let problem = Problem::verification(&model, specification);
    let mut options = IterationOptions::default();
    options.device = Device::Gpu;
    let result = ValueIterationDriver::solve(&problem, Algorithm::OMaximization, options);
    assert!(result.is_err());
}

#[test]
fn non_omaximization_algorithms_are_rejected_at_call_time() {
    init_logging();
    let model = three_state_model();
    let target = StateSet::from_indices([2], model.num_states()).unwrap();
    let property = Property::<f64>::finite_time_reachability(target, 1).unwrap();
    let specification = Specification::build(
        property,
        SatisfactionMode::Pessimistic,
        StrategyMode::Maximize,
    );
    let problem = Problem::verification(&model, specification);

    let vertex_result = ValueIterationDriver::solve(
        &problem,
        Algorithm::VertexEnumeration,
        IterationOptions::default(),
    );
    assert!(vertex_result.is_err());

    let lp_result = ValueIterationDriver::solve(
        &problem,
        Algorithm::LpMcCormickRelaxation(Box::new(OMaximizationKernel)),
        IterationOptions::default(),
    );
    assert!(lp_result.is_err());
}
