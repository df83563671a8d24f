use downcast_rs::impl_downcast;
use downcast_rs::Downcast;
use dyn_clone::clone_trait_object;
use dyn_clone::DynClone;
use enumset::EnumSet;
use enumset::EnumSetType;

use super::Domains;
use super::LocalId;
use super::PropagationContextMut;
use crate::basic_types::Contradiction;
use crate::basic_types::PropagationStatus;
#[cfg(doc)]
use crate::engine::notifications::DomainEvent;
use crate::engine::notifications::DomainEvents;
use crate::engine::notifications::OpaqueDomainEvent;
#[cfg(doc)]
use crate::engine::variables::IntegerVariable;
#[cfg(doc)]
use crate::engine::State;
#[cfg(doc)]
use crate::propagation::PropagatorConstructorContext;

// We need to use this to cast from `Box<dyn Propagator>` to a concrete propagator; rust
// inherently does not allow downcasting from the trait definition to its concrete type.
impl_downcast!(Propagator);

// To allow the State object to be cloneable, we need to allow `Box<dyn Propagator>` to be cloned.
clone_trait_object!(Propagator);

/// A propagator removes values from domains which will never be in any solution, or raises
/// explicit conflicts.
///
/// The only required functions are [`Propagator::name`] and [`Propagator::propagate`]; all
/// other functions have default implementations.
///
/// See the [`crate::propagation`] documentation for more details.
pub trait Propagator: Downcast + DynClone {
    /// Return the name of the propagator.
    ///
    /// This is a convenience method that is used for printing.
    fn name(&self) -> &str;

    /// Returns the [`Priority`] of the propagator, used for determining the order in which
    /// propagators are called.
    ///
    /// By default the priority is set to [`Priority::VeryLow`].
    fn priority(&self) -> Priority {
        Priority::VeryLow
    }

    /// The [`DomainEvent`]s of the variable with the given [`LocalId`] which are relevant to this
    /// propagator.
    ///
    /// Registration happens in the constructor through [`PropagatorConstructorContext::register`];
    /// this function describes the same conditions so they can be inspected and used to filter
    /// events in [`Propagator::propagate_event`]. By default every event is relevant.
    fn propagation_conditions(&self, _local_id: LocalId) -> DomainEvents {
        DomainEvents::ANY_INT
    }

    /// Performs a coarse-grained propagation pass.
    ///
    /// A pass is requested either by the [`State`] (a [`PropagationEvent::Full`] pass after the
    /// propagator is added or when [`State::force_full_propagation`] is called) or by the
    /// propagator itself returning [`EnqueueDecision::Enqueue`] from
    /// [`Propagator::propagate_event`] (a [`PropagationEvent::Custom`] pass). Requests made
    /// while a pass is pending are merged, so `events` may contain both.
    ///
    /// In case no conflict has been detected this function should return [`Result::Ok`],
    /// otherwise it should return a [`Contradiction`]; either because a domain operation would
    /// empty a domain, or because the logic of the propagator found the current state to be
    /// inconsistent (see [`PropagationContextMut::conflict`]).
    fn propagate(
        &mut self,
        context: PropagationContextMut,
        events: EnumSet<PropagationEvent>,
    ) -> PropagationStatus;

    /// Called when a [`DomainEvent`] happens to one of the variables the propagator is
    /// subscribed to. Events which happened to the same variable since the previous call are
    /// merged into one [`OpaqueDomainEvent`], which should be decoded through
    /// [`IntegerVariable::unpack_event`] of the registered variable.
    ///
    /// This can be used to incrementally maintain trailed state and to perform cheap
    /// propagations. The return value determines whether a [`PropagationEvent::Custom`] pass is
    /// requested.
    ///
    /// By default a pass is always requested.
    fn propagate_event(
        &mut self,
        _context: PropagationContextMut,
        _local_id: LocalId,
        _event: OpaqueDomainEvent,
    ) -> Result<EnqueueDecision, Contradiction> {
        Ok(EnqueueDecision::Enqueue)
    }

    /// Determines, without modifying any domain, whether the constraint is satisfied by every
    /// assignment of the current domains, by none of them, or neither.
    fn is_entailed(&self, _domains: Domains) -> Entailment {
        Entailment::Undefined
    }
}

/// The kind of coarse-grained pass which is requested of a propagator.
#[derive(Debug, EnumSetType, Hash)]
pub enum PropagationEvent {
    /// Propagate from scratch, recomputing all incremental state.
    Full,
    /// Propagate using the incremental state.
    Custom,
}

/// Indicator of what to do when a propagator is notified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnqueueDecision {
    /// The propagator should be enqueued.
    Enqueue,
    /// The propagator should not be enqueued.
    Skip,
}

/// The answer to [`Propagator::is_entailed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Entailment {
    /// Every assignment of the current domains satisfies the constraint.
    True,
    /// No assignment of the current domains satisfies the constraint.
    False,
    /// Some assignments might satisfy the constraint and some might not.
    Undefined,
}

/// The priority of a propagator, used for determining the order in which propagators will be
/// called.
///
/// Propagators with high priority are propagated before propagators with low(er) priority. If two
/// propagators have the same priority, then they are propagated in the order in which they were
/// enqueued.
///
/// Typically, propagators with low computational complexity should be assigned a high
/// priority (i.e., should be propagated before computationally expensive propagators).
#[derive(Default, Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[repr(u8)]
pub enum Priority {
    High = 0,
    Medium = 1,
    Low = 2,
    #[default]
    VeryLow = 3,
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        ((*self) as u8).partial_cmp(&((*other) as u8))
    }
}
