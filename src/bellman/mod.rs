//! The robust Bellman operator: single-marginal O-maximization (§4.5),
//! its recursive factored generalization (§4.6), and the scratch it reuses
//! across iterations (§5).

pub mod factored;
pub mod omax;
pub mod workspace;

pub use factored::factored_bellman;
pub use omax::omax;
pub use workspace::{FactoredScratch, Workspace};
