//! The two binary choices that parameterize every robust Bellman update
//! and reduction (§3).

/// Whether the robust Bellman operator takes the infimum (`Pessimistic`)
/// or supremum (`Optimistic`) over the feasible distributions of an
/// ambiguity set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatisfactionMode {
    Pessimistic,
    Optimistic,
}

/// Whether the outer reduction over actions at a state takes the maximum
/// (`Maximize`) or minimum (`Minimize`) of the per-action Bellman values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyMode {
    Maximize,
    Minimize,
}
