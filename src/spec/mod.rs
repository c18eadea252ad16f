//! Properties and specifications: what the driver solves for (§3, §4.9, §6).

pub mod property;
pub mod specification;

pub use property::{Horizon, Property, StateSet};
pub use specification::{Problem, ProblemKind, Specification};
