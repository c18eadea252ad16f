//! Algorithm dispatch, driver configuration, and the value-iteration
//! driver itself (§4.10, §5, §6, §9).

pub mod algorithm;
pub mod driver;
pub mod options;

pub use algorithm::{Algorithm, BellmanKernel, OMaximizationKernel};
pub use driver::{BellmanSystem, SolveOutcome, SolveResult, StrategyOutput, ValueIterationDriver};
pub use options::{Device, IterationOptions, StrategySetting, Termination};
