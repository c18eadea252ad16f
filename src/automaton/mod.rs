//! DFA, labelling, and the lazy fRMDP×DFA product (§3, §4.7).

pub mod dfa;
pub mod product;

pub use dfa::{Dfa, Labelling};
pub use product::ProductProcess;
