//! The generic value scalar `R` used throughout the crate.

use num_traits::{Float, One, Zero};

/// A real-valued scalar usable as a probability / value in the robust
/// Bellman operator and the value-iteration driver.
///
/// Implemented for `f32` and `f64`. Downstream code that needs exact
/// rationals can add its own impl; nothing in the crate assumes floating
/// point beyond what [`Float`] already provides.
pub trait Scalar:
    Float
    + Zero
    + One
    + Copy
    + Send
    + Sync
    + std::fmt::Debug
    + std::fmt::Display
    + std::iter::Sum
    + 'static
{
}

impl<T> Scalar for T where
    T: Float
        + Zero
        + One
        + Copy
        + Send
        + Sync
        + std::fmt::Debug
        + std::fmt::Display
        + std::iter::Sum
        + 'static
{
}
