//! The Among constraint: `counter = |{ i : variables[i] ∈ values }|`.
mod among_propagator;
mod options;

pub use among_propagator::*;
pub use options::*;
