//! Contains the main building blocks for propagators.
//!
//! # Background
//!
//! A propagator takes as input a set of variables (<code>x<sub>i</sub> ∈ X</code>) and for each
//! variable a corresponding domain (<code>D<sub>i</sub> ∈ D</code>); it can then be seen as a
//! function which maps `D ↦ D'` such that <code>D'<sub>i</sub> ⊆ D<sub>i</sub></code> for all
//! variables (i.e. the domain of a variable either remains the same after applying the propagator
//! or it becomes a subset of the domain before applying the propagator).
//!
//! A propagator is said to be at fix-point if <code>D<sub>x</sub> = D'<sub>x</sub></code> meaning
//! that no further propagations can take place when applying the propagator. A propagator is said
//! to be "idempotent" if a single call to it will result in it being at fix-point.
//!
//! For more information about the construction of these types of propagation-based solvers, we
//! refer to [\[1\]](https://dl.acm.org/doi/pdf/10.1145/1452044.1452046).
//!
//! # Practical
//!
//! Each concrete propagator is associated with one trait: [`Propagator`]. The main function to
//! implement for this trait is [`Propagator::propagate`], which performs the domain reduction.
//!
//! A propagator is created by a [`PropagatorConstructor`]. The constructor is responsible for
//! registering to domain events, and setting up the state of the propagator, including the
//! [`TrailedInteger`]s and [`TrailedSet`]s it maintains incrementally. Trailed values are
//! restored by the [`State`] when it backtracks, so a propagator never has to undo its own
//! bookkeeping.
//!
//! Propagation is driven by two kinds of events:
//! - [`DomainEvent`]s of registered variables are delivered one variable at a time through
//!   [`Propagator::propagate_event`]. Events which happen to the same variable before the
//!   propagator is notified are merged.
//! - [`PropagationEvent`]s request a coarse-grained pass through [`Propagator::propagate`]. The
//!   [`State`] requests a [`PropagationEvent::Full`] pass when the propagator is added; the
//!   propagator requests [`PropagationEvent::Custom`] passes from
//!   [`Propagator::propagate_event`].
//!
//! We do not require propagators to be idempotent and it can be assumed that if a propagator is
//! not at fix-point after propagating that it will be called again until no further propagations
//! happen.
//!
//! See the [`crate::propagators`] module for concrete propagator implementations.
//!
//! # Bibliography
//!
//! \[1\] C. Schulte and P. J. Stuckey, ‘Efficient constraint propagation engines’, ACM Transactions
//! on Programming Languages and Systems (TOPLAS), vol. 31, no. 1, pp. 1–43, 2008.
//!
//! \[2\] C. Schulte and G. Tack, ‘Views and iterators for generic constraint implementations’, in
//! International Workshop on Constraint Solving and Constraint Logic Programming, 2005, pp.
//! 118–132.

mod constructor;
mod contexts;
mod domains;
mod local_id;
mod propagator;

pub(crate) mod propagator_id;
pub(crate) mod propagator_var_id;
pub(crate) mod store;

pub use constructor::*;
pub use contexts::*;
pub use domains::*;
pub use local_id::*;
pub use propagator::*;
pub use propagator_id::PropagatorId;
pub(crate) use propagator_var_id::PropagatorVarId;
pub use store::PropagatorHandle;

pub use crate::engine::notifications::DomainEvent;
pub use crate::engine::notifications::DomainEvents;
pub use crate::engine::notifications::OpaqueDomainEvent;
#[cfg(doc)]
use crate::engine::State;
pub use crate::engine::TrailedInteger;
pub use crate::engine::TrailedSet;
