use super::Domains;
use super::LocalId;
use super::Propagator;
use super::PropagatorId;
use super::PropagatorVarId;
use crate::engine::notifications::DomainEvents;
use crate::engine::notifications::Watchers;
use crate::engine::variables::IntegerVariable;
use crate::engine::Assignments;
use crate::engine::State;
use crate::engine::TrailedInteger;
use crate::engine::TrailedSet;
use crate::engine::TrailedValues;
use crate::propagation::HasAssignments;

/// A propagator constructor creates a fully initialized instance of a [`Propagator`].
///
/// The constructor is responsible for indicating on which events the propagator should be
/// enqueued. Additionally, the propagator can be initialized with values that come from the state
/// of the solver, and can allocate the trailed values it maintains incrementally.
pub trait PropagatorConstructor {
    /// The propagator that is produced by this constructor.
    type PropagatorImpl: Propagator + Clone;

    /// Create the propagator instance from `Self`.
    fn create(self, context: PropagatorConstructorContext) -> Self::PropagatorImpl;
}

/// [`PropagatorConstructorContext`] is used when [`Propagator`]s are initialised after creation.
///
/// It represents a communication point between the [`State`] and the [`Propagator`].
/// Propagators use the [`PropagatorConstructorContext`] to register to domain changes
/// of variables, to retrieve the current bounds of variables and to create trailed values.
#[derive(Debug)]
pub struct PropagatorConstructorContext<'a> {
    state: &'a mut State,
    pub(crate) propagator_id: PropagatorId,
}

impl PropagatorConstructorContext<'_> {
    pub(crate) fn new(
        propagator_id: PropagatorId,
        state: &mut State,
    ) -> PropagatorConstructorContext<'_> {
        PropagatorConstructorContext {
            propagator_id,
            state,
        }
    }

    /// Get domain information.
    pub fn domains(&self) -> Domains<'_> {
        Domains::new(&self.state.assignments, &self.state.trailed_values)
    }

    /// Subscribes the propagator to the given [`DomainEvents`].
    ///
    /// The domain events determine when [`Propagator::propagate_event`] will be called on the
    /// propagator. The [`LocalId`] is internal information related to the propagator, which is
    /// used when calling [`Propagator::propagate_event`] to identify the variable.
    ///
    /// Each variable *must* have a unique [`LocalId`]. Most often this would be its index of the
    /// variable in the internal array of variables.
    pub fn register(
        &mut self,
        var: impl IntegerVariable,
        domain_events: DomainEvents,
        local_id: LocalId,
    ) {
        let propagator_var = PropagatorVarId {
            propagator: self.propagator_id,
            variable: local_id,
        };

        let mut watchers = Watchers::new(propagator_var, &mut self.state.notification_engine);
        var.watch_all(&mut watchers, domain_events.events());
    }

    /// Create a [`TrailedInteger`] which is restored when the state backtracks.
    pub fn new_trailed_integer(&mut self, initial_value: i64) -> TrailedInteger {
        self.state.trailed_values.grow(initial_value)
    }

    /// Create an empty [`TrailedSet`] over the universe `0..capacity`.
    pub fn new_trailed_set(&mut self, capacity: usize) -> TrailedSet {
        self.state.trailed_values.new_set(capacity)
    }
}

impl HasAssignments for PropagatorConstructorContext<'_> {
    fn assignments(&self) -> &Assignments {
        &self.state.assignments
    }

    fn trailed_values(&self) -> &TrailedValues {
        &self.state.trailed_values
    }
}
