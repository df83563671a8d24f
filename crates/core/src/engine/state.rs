use enumset::EnumSet;
use log::debug;

use crate::basic_types::Cause;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::Contradiction;
use crate::basic_types::EmptyDomain;
use crate::basic_types::PropagationStatus;
use crate::engine::notifications::DomainEvent;
use crate::engine::notifications::NotificationEngine;
use crate::engine::notifications::OpaqueDomainEvent;
use crate::engine::variables::DomainId;
use crate::engine::variables::IntegerVariable;
use crate::engine::Assignments;
use crate::engine::EngineOptions;
use crate::engine::PropagatorQueue;
use crate::engine::SelfNotification;
use crate::engine::TrailedValues;
use crate::propagation::store::PropagatorStore;
use crate::propagation::Domains;
use crate::propagation::EnqueueDecision;
use crate::propagation::Entailment;
use crate::propagation::PropagationContextMut;
use crate::propagation::PropagationEvent;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::propagation::PropagatorHandle;
use crate::propagation::PropagatorId;
use crate::propagation::PropagatorVarId;
use crate::propcore_assert_eq_simple;
use crate::propcore_assert_simple;

/// The [`State`] is the container of variables and propagators.
///
/// It owns the domains, the trailed values of the propagators, the watch lists and the queues,
/// and drives propagation to a fixed point. Search is performed by the caller through
/// [`State::new_checkpoint`] and [`State::restore_to`].
///
/// [`State`] implements [`Clone`], and cloning the [`State`] will create a fresh copy of the
/// [`State`]. If the [`State`] is large, this may be extremely expensive.
#[derive(Debug, Clone)]
pub struct State {
    /// The list of propagators; propagators live here and are queried when events (domain changes)
    /// happen.
    pub(crate) propagators: PropagatorStore,
    /// Tracks information related to the assignments of integer variables.
    pub(crate) assignments: Assignments,
    /// Keep track of trailed values (i.e. values which automatically backtrack).
    pub(crate) trailed_values: TrailedValues,
    /// Dictates the order in which propagators will be called to propagate.
    pub(crate) propagator_queue: PropagatorQueue,
    /// Delivers domain events to the propagators which watch the changed domains.
    pub(crate) notification_engine: NotificationEngine,
    /// The contradiction of the last call to [`State::propagate_to_fixed_point`], until the state
    /// is restored.
    contradiction: Option<Contradiction>,
    options: EngineOptions,
}

impl Default for State {
    fn default() -> Self {
        State::new(EngineOptions::default())
    }
}

impl State {
    pub fn new(options: EngineOptions) -> Self {
        let skip_own_events = options.self_notification == SelfNotification::Skip;

        State {
            propagators: PropagatorStore::default(),
            assignments: Assignments::default(),
            trailed_values: TrailedValues::default(),
            propagator_queue: PropagatorQueue::default(),
            notification_engine: NotificationEngine::new(skip_own_events),
            contradiction: None,
            options,
        }
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }
}

/// Operations to create variables.
impl State {
    /// Create a new integer variable with the domain `[lower_bound, upper_bound]`. Only the bounds
    /// of the domain are tracked; removing a value between the bounds has no effect.
    ///
    /// Creation of new domains is not influenced by the current checkpoint of the state. If
    /// a domain is created at a non-zero checkpoint, then it will _not_ 'disappear' when
    /// backtracking past the checkpoint where the domain was created.
    pub fn new_interval_variable(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        propcore_assert_simple!(
            lower_bound <= upper_bound,
            "the domain [{lower_bound}, {upper_bound}] is empty"
        );

        let domain_id = self.assignments.grow(lower_bound, upper_bound);
        self.notification_engine.grow();

        domain_id
    }

    /// Creates a new enumerated domain with the given values, in which every value is tracked
    /// individually.
    ///
    /// Note that this is implemented as an interval domain with explicit holes in the domain. For
    /// very sparse domains, this can result in a high memory overhead.
    ///
    /// For more information on creation of domains, see [`State::new_interval_variable`].
    pub fn new_sparse_variable(&mut self, values: Vec<i32>) -> DomainId {
        propcore_assert_simple!(!values.is_empty(), "the domain of a variable cannot be empty");

        let domain_id = self.assignments.create_new_integer_variable_sparse(values);
        self.notification_engine.grow();

        domain_id
    }

    /// Creates a new enumerated domain containing every value in `[lower_bound, upper_bound]`.
    pub fn new_enumerated_variable(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        self.new_sparse_variable((lower_bound..=upper_bound).collect())
    }

    pub fn num_domains(&self) -> usize {
        self.assignments.num_domains()
    }
}

/// Operations to retrieve information about values
impl State {
    /// Returns the lower-bound of the given `variable`.
    pub fn lower_bound<Var: IntegerVariable>(&self, variable: Var) -> i32 {
        variable.lower_bound(&self.assignments)
    }

    /// Returns the upper-bound of the given `variable`.
    pub fn upper_bound<Var: IntegerVariable>(&self, variable: Var) -> i32 {
        variable.upper_bound(&self.assignments)
    }

    /// Returns whether the given `variable` contains the provided `value`.
    pub fn contains<Var: IntegerVariable>(&self, variable: Var, value: i32) -> bool {
        variable.contains(&self.assignments, value)
    }

    /// Returns the number of values in the domain of the given `variable`.
    pub fn size<Var: IntegerVariable>(&self, variable: Var) -> usize {
        variable.size(&self.assignments)
    }

    /// If the given `variable` is fixed, then [`Some`] containing the assigned value is
    /// returned. Otherwise, [`None`] is returned.
    pub fn fixed_value<Var: IntegerVariable>(&self, variable: Var) -> Option<i32> {
        variable
            .is_fixed(&self.assignments)
            .then(|| variable.lower_bound(&self.assignments))
    }

    /// The values in the domain of the given `variable`, in increasing order.
    pub fn values<Var: IntegerVariable>(&self, variable: Var) -> Vec<i32> {
        variable.iterate_domain(&self.assignments).collect()
    }

    /// Get the current domains.
    pub fn domains(&self) -> Domains<'_> {
        Domains::new(&self.assignments, &self.trailed_values)
    }

    /// The underlying [`Assignments`], which is needed to query variables directly through
    /// [`IntegerVariable`].
    pub fn assignments(&self) -> &Assignments {
        &self.assignments
    }

    /// The number of domain changes on the trail.
    pub fn num_trail_entries(&self) -> usize {
        self.assignments.num_trail_entries()
    }
}

/// Operations for modifying the domains as decisions.
///
/// A change is returned as `true` if a domain changed, and `false` if it already held. If the
/// change would empty a domain, an [`EmptyDomain`] error is returned and the domain is left
/// untouched.
///
/// These methods do _not_ perform any propagation. For that, an explicit call to
/// [`State::propagate_to_fixed_point`] is required. This allows multiple decisions to be made
/// before the entire propagation engine is invoked.
impl State {
    pub fn set_lower_bound<Var: IntegerVariable>(
        &mut self,
        variable: Var,
        bound: i32,
    ) -> Result<bool, EmptyDomain> {
        variable.update_lower_bound(&mut self.assignments, bound, Cause::Decision)
    }

    pub fn set_upper_bound<Var: IntegerVariable>(
        &mut self,
        variable: Var,
        bound: i32,
    ) -> Result<bool, EmptyDomain> {
        variable.update_upper_bound(&mut self.assignments, bound, Cause::Decision)
    }

    pub fn remove<Var: IntegerVariable>(
        &mut self,
        variable: Var,
        value: i32,
    ) -> Result<bool, EmptyDomain> {
        variable.remove_value(&mut self.assignments, value, Cause::Decision)
    }

    pub fn remove_interval<Var: IntegerVariable>(
        &mut self,
        variable: Var,
        lower: i32,
        upper: i32,
    ) -> Result<bool, EmptyDomain> {
        variable.remove_interval(&mut self.assignments, lower, upper, Cause::Decision)
    }

    pub fn instantiate<Var: IntegerVariable>(
        &mut self,
        variable: Var,
        value: i32,
    ) -> Result<bool, EmptyDomain> {
        variable.instantiate_to(&mut self.assignments, value, Cause::Decision)
    }
}

/// Operations for adding constraints.
impl State {
    /// Add a new propagator to the [`State`]. The constructor for that propagator should
    /// subscribe to the appropriate domain events so that the propagator is called when
    /// necessary.
    ///
    /// While the propagator is added to the queue for a [`PropagationEvent::Full`] pass, this
    /// function does _not_ trigger a round of propagation. An explicit call to
    /// [`State::propagate_to_fixed_point`] is necessary to run the new propagator for the first
    /// time.
    pub fn add_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> PropagatorHandle<Constructor::PropagatorImpl>
    where
        Constructor: PropagatorConstructor,
        Constructor::PropagatorImpl: 'static,
    {
        let original_handle: PropagatorHandle<Constructor::PropagatorImpl> =
            self.propagators.new_propagator().key();
        let constructor_context =
            PropagatorConstructorContext::new(original_handle.propagator_id(), self);
        let propagator = constructor.create(constructor_context);

        let slot = self.propagators.new_propagator();
        let handle = slot.populate(Box::new(propagator));

        propcore_assert_eq_simple!(handle.propagator_id(), original_handle.propagator_id());

        debug!(
            "added {} as {}",
            self.propagators[handle.propagator_id()].name(),
            handle.propagator_id()
        );
        self.force_full_propagation(handle);

        handle
    }

    /// Add a propagator at the root and propagate it to a fixed point.
    ///
    /// If the propagator is found to be infeasible, the [`State`] stays infeasible; it is
    /// reported through [`ConstraintOperationError::InfeasiblePropagator`].
    pub fn add_constraint<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<PropagatorHandle<Constructor::PropagatorImpl>, ConstraintOperationError>
    where
        Constructor: PropagatorConstructor,
        Constructor::PropagatorImpl: 'static,
    {
        if self.get_checkpoint() != 0 {
            return Err(ConstraintOperationError::NotAtRoot);
        }
        if self.contradiction.is_some() {
            return Err(ConstraintOperationError::InfeasibleState);
        }

        let handle = self.add_propagator(constructor);
        self.propagate_to_fixed_point()
            .map_err(|_| ConstraintOperationError::InfeasiblePropagator)?;

        Ok(handle)
    }

    /// Request a [`PropagationEvent::Full`] pass of the given propagator during the next call to
    /// [`State::propagate_to_fixed_point`].
    pub fn force_full_propagation<P: Propagator>(&mut self, handle: PropagatorHandle<P>) {
        let propagator_id = handle.propagator_id();
        let priority = self.propagators[propagator_id].priority();
        self.propagator_queue.enqueue_propagator(
            propagator_id,
            priority,
            PropagationEvent::Full.into(),
        );
    }

    pub fn num_propagators(&self) -> usize {
        self.propagators.num_propagators()
    }
}

/// Operations for retrieving propagators.
impl State {
    /// Get a reference to the propagator identified by the given handle.
    ///
    /// For an exclusive reference, use [`State::get_propagator_mut`].
    pub fn get_propagator<P: Propagator>(&self, handle: PropagatorHandle<P>) -> Option<&P> {
        self.propagators.get_propagator(handle)
    }

    /// Get an exclusive reference to the propagator identified by the given handle.
    pub fn get_propagator_mut<P: Propagator>(
        &mut self,
        handle: PropagatorHandle<P>,
    ) -> Option<&mut P> {
        self.propagators.get_propagator_mut(handle)
    }

    /// Ask the propagator whether its constraint is entailed by the current domains.
    pub fn is_entailed<P: Propagator>(&self, handle: PropagatorHandle<P>) -> Entailment {
        self.propagators[handle.propagator_id()].is_entailed(self.domains())
    }
}

/// Operations for checkpointing and propagation.
impl State {
    /// The current checkpoint; `0` is the root.
    pub fn get_checkpoint(&self) -> usize {
        self.assignments.get_checkpoint()
    }

    /// Create a checkpoint of the current [`State`], that can be returned to with
    /// [`State::restore_to`].
    ///
    /// The current checkpoint can be retrieved using the method [`State::get_checkpoint`].
    ///
    /// If the state is not at fixed-point, then this method will panic.
    ///
    /// # Example
    /// ```
    /// use propcore::state::State;
    ///
    /// let mut state = State::default();
    /// let variable = state.new_interval_variable(1, 10);
    ///
    /// assert_eq!(state.get_checkpoint(), 0);
    ///
    /// state.new_checkpoint();
    ///
    /// assert_eq!(state.get_checkpoint(), 1);
    ///
    /// let _ = state
    ///     .set_upper_bound(variable, 5)
    ///     .expect("The lower bound is 1 so the domain is not empty");
    /// assert_eq!(state.upper_bound(variable), 5);
    ///
    /// state.restore_to(0);
    ///
    /// assert_eq!(state.get_checkpoint(), 0);
    /// assert_eq!(state.upper_bound(variable), 10);
    /// ```
    pub fn new_checkpoint(&mut self) {
        propcore_assert_simple!(
            self.propagator_queue.is_empty() && !self.notification_engine.has_pending_events(),
            "Can only create a new checkpoint when all propagation has occurred"
        );
        propcore_assert_simple!(
            self.contradiction.is_none(),
            "Cannot create a checkpoint in a state with a contradiction"
        );

        self.assignments.new_checkpoint();
        self.trailed_values.new_checkpoint();
        propcore_assert_eq_simple!(
            self.assignments.get_checkpoint(),
            self.trailed_values.get_checkpoint()
        );

        debug!("entered checkpoint {}", self.get_checkpoint());
    }

    /// Restore to the given checkpoint. Every domain and every trailed value is reset to the value
    /// it had when the checkpoint was entered, and pending propagation is discarded.
    ///
    /// If the provided checkpoint is equal to the current checkpoint, this is a no-op. If
    /// the provided checkpoint is larger than the current checkpoint, this method will
    /// panic.
    ///
    /// See [`State::new_checkpoint`] for an example.
    pub fn restore_to(&mut self, checkpoint: usize) {
        propcore_assert_simple!(
            checkpoint <= self.get_checkpoint(),
            "cannot restore to checkpoint {checkpoint}, the current checkpoint is {}",
            self.get_checkpoint()
        );

        if checkpoint == self.get_checkpoint() {
            return;
        }

        let num_domain_changes = self.assignments.num_trail_entries();
        let num_trailed_changes = (checkpoint + 1..=self.get_checkpoint())
            .map(|undone| self.trailed_values.num_changes_at_checkpoint(undone))
            .sum::<usize>();

        self.assignments.synchronise(checkpoint);
        self.trailed_values.synchronise(checkpoint);
        self.propagator_queue.clear();
        self.notification_engine.clear();
        self.contradiction = None;

        debug!(
            "restored to checkpoint {checkpoint}: undid {} domain changes and \
             {num_trailed_changes} trailed changes",
            num_domain_changes - self.assignments.num_trail_entries(),
        );
    }

    /// Restore to the checkpoint before the current one.
    pub fn pop_checkpoint(&mut self) {
        propcore_assert_simple!(self.get_checkpoint() > 0, "cannot pop the root checkpoint");
        self.restore_to(self.get_checkpoint() - 1);
    }

    /// Performs fixed-point propagation using the propagators defined in the [`State`].
    ///
    /// Domain events are delivered to [`Propagator::propagate_event`] first, one (propagator,
    /// variable) pair at a time; when no events are pending, the coarse-grained pass of the
    /// propagator with the highest priority is performed. This continues until no propagator has
    /// pending work.
    ///
    /// It could be that the current [`State`] implies a contradiction by propagation. In that
    /// case, the [`Contradiction`] is returned.
    ///
    /// Once the [`State`] has a contradiction, then the only operation that is defined is
    /// [`State::restore_to`]; propagating again returns the same contradiction.
    pub fn propagate_to_fixed_point(&mut self) -> PropagationStatus {
        if let Some(contradiction) = self.contradiction {
            return Err(contradiction);
        }

        loop {
            self.notification_engine
                .notify_propagators_about_domain_events(&mut self.assignments);

            let status = if let Some((propagator_var, events)) =
                self.notification_engine.pop_event()
            {
                self.propagate_event(propagator_var, events)
            } else if let Some((propagator_id, events)) = self.propagator_queue.pop() {
                self.propagate(propagator_id, events)
            } else {
                break;
            };

            if let Err(contradiction) = status {
                debug!(
                    "contradiction at checkpoint {}: {contradiction}",
                    self.get_checkpoint()
                );

                self.propagator_queue.clear();
                self.notification_engine.clear();
                self.contradiction = Some(contradiction);
                return Err(contradiction);
            }
        }

        Ok(())
    }

    fn propagate_event(
        &mut self,
        propagator_var: PropagatorVarId,
        events: EnumSet<DomainEvent>,
    ) -> PropagationStatus {
        let propagator_id = propagator_var.propagator;
        let propagator = &mut self.propagators[propagator_id];
        let context = PropagationContextMut::new(
            &mut self.trailed_values,
            &mut self.assignments,
            propagator_id,
        );

        let decision = propagator.propagate_event(
            context,
            propagator_var.variable,
            OpaqueDomainEvent::from(events),
        )?;

        if decision == EnqueueDecision::Enqueue {
            self.propagator_queue.enqueue_propagator(
                propagator_id,
                propagator.priority(),
                PropagationEvent::Custom.into(),
            );
        }

        Ok(())
    }

    fn propagate(
        &mut self,
        propagator_id: PropagatorId,
        events: EnumSet<PropagationEvent>,
    ) -> PropagationStatus {
        let propagator = &mut self.propagators[propagator_id];
        let context = PropagationContextMut::new(
            &mut self.trailed_values,
            &mut self.assignments,
            propagator_id,
        );

        propagator.propagate(context, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::DomainEvents;
    use crate::propagation::LocalId;
    use crate::propagation::ReadDomains;
    use crate::propagators::AmongArgs;
    use crate::propagators::AmongOptions;

    /// Raises the lower bound of its variable to `target` and counts the events it receives.
    #[derive(Clone, Debug)]
    struct RaiseLowerBound {
        variable: DomainId,
        target: i32,
        num_events: usize,
    }

    impl PropagatorConstructor for RaiseLowerBound {
        type PropagatorImpl = Self;

        fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
            context.register(self.variable, DomainEvents::ANY_INT, LocalId::from(0));
            self
        }
    }

    impl Propagator for RaiseLowerBound {
        fn name(&self) -> &str {
            "RaiseLowerBound"
        }

        fn propagate(
            &mut self,
            mut context: PropagationContextMut,
            _events: EnumSet<PropagationEvent>,
        ) -> PropagationStatus {
            let _ = context.set_lower_bound(&self.variable, self.target)?;
            Ok(())
        }

        fn propagate_event(
            &mut self,
            _context: PropagationContextMut,
            _local_id: LocalId,
            _event: OpaqueDomainEvent,
        ) -> Result<EnqueueDecision, Contradiction> {
            self.num_events += 1;
            Ok(EnqueueDecision::Skip)
        }
    }

    fn count_events(options: EngineOptions) -> usize {
        let mut state = State::new(options);
        let variable = state.new_interval_variable(0, 10);
        let handle = state
            .add_constraint(RaiseLowerBound {
                variable,
                target: 3,
                num_events: 0,
            })
            .expect("the bound can be raised");

        assert_eq!(state.lower_bound(variable), 3);
        state
            .get_propagator(handle)
            .expect("handle refers to the propagator")
            .num_events
    }

    #[test]
    fn own_events_are_delivered_by_default() {
        assert_eq!(count_events(EngineOptions::default()), 1);
    }

    #[test]
    fn own_events_can_be_skipped() {
        let options = EngineOptions {
            self_notification: SelfNotification::Skip,
        };
        assert_eq!(count_events(options), 0);
    }

    #[test]
    fn constraints_can_only_be_added_at_the_root() {
        let mut state = State::default();
        let variable = state.new_interval_variable(0, 10);
        state.new_checkpoint();

        let result = state.add_constraint(RaiseLowerBound {
            variable,
            target: 3,
            num_events: 0,
        });

        assert!(matches!(result, Err(ConstraintOperationError::NotAtRoot)));
    }

    #[test]
    fn infeasible_constraints_leave_the_state_infeasible() {
        let mut state = State::default();
        let variable = state.new_interval_variable(0, 10);

        let result = state.add_constraint(RaiseLowerBound {
            variable,
            target: 11,
            num_events: 0,
        });
        assert!(matches!(
            result,
            Err(ConstraintOperationError::InfeasiblePropagator)
        ));

        let result = state.add_constraint(RaiseLowerBound {
            variable,
            target: 1,
            num_events: 0,
        });
        assert!(matches!(result, Err(ConstraintOperationError::InfeasibleState)));
    }

    #[test]
    fn contradiction_persists_until_restore() {
        let mut state = State::default();
        let x = state.new_sparse_variable(vec![1, 2]);
        let counter = state.new_interval_variable(0, 1);
        let _ = state
            .add_constraint(AmongArgs {
                variables: vec![x].into(),
                counter,
                values: vec![1],
                options: AmongOptions::default(),
            })
            .expect("the constraint is feasible");

        state.new_checkpoint();
        let _ = state.set_lower_bound(counter, 1).expect("1 remains");
        let _ = state.set_lower_bound(x, 2).expect("2 remains");

        let first = state.propagate_to_fixed_point().expect_err("x cannot take 1");
        let second = state.propagate_to_fixed_point().expect_err("still infeasible");
        assert_eq!(first, second);

        state.restore_to(0);
        assert!(state.propagate_to_fixed_point().is_ok());
        assert_eq!(state.values(x), vec![1, 2]);
        assert_eq!(state.lower_bound(counter), 0);
    }

    #[test]
    fn restoring_to_the_current_checkpoint_keeps_the_domains() {
        let mut state = State::default();
        let x = state.new_interval_variable(0, 10);
        state.new_checkpoint();
        let _ = state.set_upper_bound(x, 4).expect("0..=4 remains");

        state.restore_to(1);

        assert_eq!(state.upper_bound(x), 4);
        assert_eq!(state.get_checkpoint(), 1);
    }

    #[test]
    fn trailed_values_follow_the_checkpoints() {
        let mut state = State::default();
        let x = state.new_sparse_variable(vec![1, 2, 3]);
        let y = state.new_sparse_variable(vec![1, 2, 3]);
        let counter = state.new_interval_variable(0, 2);
        let handle = state
            .add_constraint(AmongArgs {
                variables: vec![x, y].into(),
                counter,
                values: vec![3],
                options: AmongOptions::default(),
            })
            .expect("the constraint is feasible");

        state.new_checkpoint();
        let _ = state.instantiate(x, 3).expect("3 is in the domain");
        state.propagate_to_fixed_point().expect("feasible");
        state.new_checkpoint();
        let _ = state.remove(y, 3).expect("1 and 2 remain");
        state.propagate_to_fixed_point().expect("feasible");

        let sure = |state: &State| {
            state
                .get_propagator(handle)
                .expect("among propagator")
                .num_sure(state.domains())
        };
        assert_eq!(sure(&state), 1);
        assert_eq!(state.upper_bound(counter), 1);

        state.pop_checkpoint();
        assert_eq!(sure(&state), 1);
        assert_eq!(state.upper_bound(counter), 2);

        state.pop_checkpoint();
        assert_eq!(sure(&state), 0);
        assert_eq!(state.domains().size(&x), 3);
    }
}
