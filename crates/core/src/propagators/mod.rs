//! Contains propagator implementations.
//!
//! See the [`crate::propagation`] module for info on propagators.

pub mod among;

pub use among::*;
