//! A propagation core for constraint solvers.
//!
//! The crate provides the pieces which a propagation-based solver is built from:
//! - a [`state::State`] which owns the variable domains, the [`trailed::TrailedValues`] of the
//!   propagators and the propagation queue, and which can be checkpointed and restored;
//! - integer variables ([`variables::DomainId`]) and views over them ([`variables::AbsView`]),
//!   all accessed through [`variables::IntegerVariable`];
//! - the [`propagation`] framework for writing propagators which update their bookkeeping
//!   incrementally;
//! - concrete [`propagators`], such as the Among constraint.
pub(crate) mod basic_types;
pub mod containers;
pub(crate) mod engine;
pub mod propagation;
pub mod propagators;

#[doc(hidden)]
pub mod asserts;

// We declare a private module with public use, so that all exports from API are exports directly
// from the crate.
//
// Example:
// `use propcore::state::State;`
// vs.
// `use propcore::api::state::State;`
mod api;

pub use api::*;
