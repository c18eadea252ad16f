//! `IterationOptions`: the "dynamic named parameter" config record for the
//! value-iteration driver (§9), grounded on `src/options.rs`'s
//! `SynthesisOptions` — a plain struct of independently defaulted fields
//! rather than a builder.

use crate::scalar::Scalar;

/// How the driver decides to stop: a fixed number of Bellman iterations,
/// or residual convergence `‖V' - V‖_∞ < epsilon`.
#[derive(Debug, Clone, Copy)]
pub enum Termination<R> {
    FixedIterations(usize),
    Convergence(R),
}

/// Which compute backend a kernel dispatch targets (§9's closed polymorphism
/// variants: `AmbiguitySetStorage ∈ {DenseCols, CscCols}`, `Device ∈ {Cpu,
/// Gpu}`). This crate only ever runs `Cpu`; `Gpu` exists so
/// [`IterationOptions::device`] has somewhere to name a backend satisfying
/// the same state-independent update semantics (§5) without the core
/// implementing one (GPU acceleration is an explicit Non-goal, §1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    #[default]
    Cpu,
    Gpu,
}

/// How the driver handles action selection and strategy recording (§4.8,
/// §9). `Given` supplies a fixed policy to evaluate: the driver looks up
/// the action for each state instead of reducing over `A(s)`.
#[derive(Debug, Clone)]
pub enum StrategySetting {
    None,
    Stationary,
    TimeVarying,
    Given(Vec<usize>),
}

/// Configuration for [`crate::solver::driver::ValueIterationDriver`].
///
/// `termination_override`, when set, replaces the termination the problem's
/// property would otherwise imply (`FiniteTime*`/`ExactTime*` properties
/// imply `FixedIterations`; `InfiniteTime*`/`ExpectedExitTime` imply
/// `Convergence`). Leave it `None` to use the property's own horizon.
pub struct IterationOptions<R> {
    pub termination_override: Option<Termination<R>>,
    /// Hard cap under `Convergence`; default `1_000_000` (§9).
    pub max_iterations: usize,
    pub strategy: StrategySetting,
    /// Thread count for the dedicated `rayon::ThreadPool` the driver
    /// builds once per `solve` call (§5.1).
    pub threads: usize,
    /// Polled between iterations; returning `true` aborts the run with a
    /// `Cancelled` outcome (§5).
    pub cancellation: Option<Box<dyn Fn() -> bool + Send + Sync>>,
    /// Which backend [`crate::solver::driver::ValueIterationDriver::solve`]
    /// should target. Always `Cpu` for this crate; `Device::Gpu` is rejected
    /// with [`crate::error::Error::InvalidParameter`] since no GPU kernel is
    /// implemented here (§1, §9).
    pub device: Device,
}

impl<R: Scalar> Default for IterationOptions<R> {
    fn default() -> Self {
        Self {
            termination_override: None,
            max_iterations: 1_000_000,
            strategy: StrategySetting::None,
            threads: 1,
            cancellation: None,
            device: Device::Cpu,
        }
    }
}

impl<R: Scalar> IterationOptions<R> {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_strategy(mut self, strategy: StrategySetting) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options: IterationOptions<f64> = IterationOptions::default();
        assert_eq!(options.max_iterations, 1_000_000);
        assert_eq!(options.threads, 1);
        assert!(matches!(options.strategy, StrategySetting::None));
        assert_eq!(options.device, Device::Cpu);
    }

    #[test]
    fn test_builder_chain() {
        let options: IterationOptions<f64> = IterationOptions::default()
            .with_threads(4)
            .with_strategy(StrategySetting::Stationary);
        assert_eq!(options.threads, 4);
        assert!(matches!(options.strategy, StrategySetting::Stationary));
    }
}
