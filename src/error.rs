//! Errors produced by the fRMDP core.

use std::fmt;

/// An error produced while constructing a model, a specification, or while
/// running value iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// An ambiguity-set invariant of the data model was violated
    /// (negative entry, `L + G > 1`, or a row-sum bound violation).
    InvalidProbabilityBounds {
        /// Index of the offending column.
        column: usize,
        /// Human-readable description of which invariant failed.
        reason: &'static str,
    },
    /// Shapes of `lower`/`upper`, of marginal index sets, or of
    /// model/specification data disagree.
    DimensionMismatch {
        /// The shape that was expected.
        expected: Vec<usize>,
        /// The shape that was found.
        found: Vec<usize>,
        /// Where the mismatch was detected.
        context: &'static str,
    },
    /// A state or action index (or a set thereof) used by a specification
    /// or model is outside the declared shape.
    InvalidIndex {
        /// The offending index.
        index: usize,
        /// The (exclusive) upper bound the index must stay below.
        bound: usize,
        /// Where the index was used.
        context: &'static str,
    },
    /// A parameter is outside its allowed range (discount, epsilon, an
    /// empty target set for reachability, mismatched compute devices).
    InvalidParameter {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Human-readable description of why it is invalid.
        reason: String,
    },
    /// A caller-imposed cap on infinite-horizon iterations was reached
    /// before convergence.
    IterationLimitExceeded {
        /// Number of iterations performed before the cap was hit.
        iterations: usize,
    },
    /// A backend could not allocate the scratch it required. The CPU
    /// backend of this crate never raises this; it exists for GPU backends
    /// conforming to the same driver contract.
    OutOfWorkspace {
        /// Bytes (or scratch slots) requested.
        requested: usize,
        /// Bytes (or scratch slots) available.
        available: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fRMDP error: ")?;
        match self {
            Self::InvalidProbabilityBounds { column, reason } => {
                write!(f, "invalid probability bounds in column {}: {}", column, reason)
            }
            Self::DimensionMismatch {
                expected,
                found,
                context,
            } => write!(
                f,
                "dimension mismatch in {}: expected {:?}, found {:?}",
                context, expected, found
            ),
            Self::InvalidIndex {
                index,
                bound,
                context,
            } => write!(
                f,
                "invalid index {} in {} (must be < {})",
                index, context, bound
            ),
            Self::InvalidParameter { parameter, reason } => {
                write!(f, "invalid parameter '{}': {}", parameter, reason)
            }
            Self::IterationLimitExceeded { iterations } => write!(
                f,
                "iteration limit exceeded after {} iterations without convergence",
                iterations
            ),
            Self::OutOfWorkspace {
                requested,
                available,
            } => write!(
                f,
                "out of workspace: requested {}, available {}",
                requested, available
            ),
        }
    }
}

impl std::error::Error for Error {}

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;
