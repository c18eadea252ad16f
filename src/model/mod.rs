//! The factored model: marginals mapping `(state, action)` to ambiguity
//! sets, and the `FactoredRMDP` that ties them together (§3, §4.3).

pub(crate) mod factored;
pub(crate) mod marginal;

pub use factored::FactoredRMDP;
pub use marginal::Marginal;
