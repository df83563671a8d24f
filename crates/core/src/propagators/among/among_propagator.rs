use enumset::EnumSet;
use itertools::Itertools;
use log::trace;

use super::AmongBackPropagation;
use super::AmongOptions;
use crate::basic_types::Contradiction;
use crate::basic_types::PropagationStatus;
use crate::containers::HashSet;
use crate::engine::notifications::DomainEvents;
use crate::engine::notifications::OpaqueDomainEvent;
use crate::engine::variables::IntegerVariable;
use crate::engine::TrailedInteger;
use crate::engine::TrailedSet;
use crate::propagation::Domains;
use crate::propagation::EnqueueDecision;
use crate::propagation::Entailment;
use crate::propagation::LocalId;
use crate::propagation::Priority;
use crate::propagation::PropagationContextMut;
use crate::propagation::PropagationEvent;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::propagation::ReadDomains;

/// The arguments of the constraint `counter = |{ i : variables[i] ∈ values }|`.
#[derive(Clone, Debug)]
pub struct AmongArgs<Var, Counter> {
    pub variables: Box<[Var]>,
    pub counter: Counter,
    /// May contain duplicates and need not be sorted.
    pub values: Vec<i32>,
    pub options: AmongOptions,
}

impl<Var, Counter> PropagatorConstructor for AmongArgs<Var, Counter>
where
    Var: IntegerVariable + 'static,
    Counter: IntegerVariable + 'static,
{
    type PropagatorImpl = AmongPropagator<Var, Counter>;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let AmongArgs {
            variables,
            counter,
            values,
            options,
        } = self;

        let values: Box<[i32]> = values.into_iter().sorted_unstable().dedup().collect();
        let value_set = values.iter().copied().collect::<HashSet<i32>>();

        for (index, variable) in variables.iter().enumerate() {
            context.register(
                variable.clone(),
                VARIABLE_CONDITIONS,
                LocalId::from(index as u32),
            );
        }
        context.register(
            counter.clone(),
            COUNTER_CONDITIONS,
            LocalId::from(variables.len() as u32),
        );

        let possible = context.new_trailed_set(variables.len());
        let num_sure = context.new_trailed_integer(0);

        AmongPropagator {
            variables,
            counter,
            values,
            value_set,
            possible,
            num_sure,
            options,
        }
    }
}

const VARIABLE_CONDITIONS: DomainEvents = DomainEvents::ANY_INT;
const COUNTER_CONDITIONS: DomainEvents = DomainEvents::ASSIGN_AND_BOUNDS;

/// How the domain of a variable relates to the tracked values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Membership {
    /// Every value of the domain is tracked.
    Sure,
    /// Some, but not all, values of the domain are tracked.
    Possible,
    /// No value of the domain is tracked.
    Impossible,
}

/// Propagator for the Among constraint, which counts how many variables take a value in a given
/// set.
///
/// The propagator incrementally maintains the number of variables which are surely in the set
/// (`num_sure`) and the set of variables which may or may not be in the set (`possible`); the
/// counter is kept within `[num_sure, num_sure + |possible|]`. When the counter is fixed to one
/// of these extremes, the variables in `possible` are forced out of, or into, the set of values.
///
/// Variables with a bounded domain can only lose values at their bounds, so back-propagation on
/// them shrinks the interval inward past the values which have to go.
#[derive(Clone, Debug)]
pub struct AmongPropagator<Var, Counter> {
    variables: Box<[Var]>,
    counter: Counter,
    /// Sorted ascending without duplicates.
    values: Box<[i32]>,
    value_set: HashSet<i32>,
    /// Indices of the variables whose domain partially overlaps the values.
    possible: TrailedSet,
    /// The number of variables whose domain is contained in the values.
    num_sure: TrailedInteger,
    options: AmongOptions,
}

impl<Var, Counter> AmongPropagator<Var, Counter>
where
    Var: IntegerVariable,
    Counter: IntegerVariable,
{
    /// The number of variables which surely take a tracked value.
    pub fn num_sure(&self, domains: Domains<'_>) -> usize {
        domains.value(self.num_sure) as usize
    }

    /// The indices of the variables which may or may not take a tracked value, in increasing
    /// order.
    pub fn possible(&self, domains: Domains<'_>) -> Vec<usize> {
        domains.set_iter(self.possible).sorted_unstable().collect()
    }

    fn counter_local_id(&self) -> LocalId {
        LocalId::from(self.variables.len() as u32)
    }

    fn classify(&self, domains: &impl ReadDomains, variable: &Var) -> Membership {
        let num_tracked = self
            .values
            .iter()
            .filter(|&&value| domains.contains(variable, value))
            .count();

        if num_tracked == domains.size(variable) {
            Membership::Sure
        } else if num_tracked > 0 {
            Membership::Possible
        } else {
            Membership::Impossible
        }
    }

    /// Recompute `possible` and `num_sure` from the domains.
    fn initialise(&self, context: &mut PropagationContextMut) {
        context.set_clear(self.possible);

        let mut num_sure = 0;
        for (index, variable) in self.variables.iter().enumerate() {
            match self.classify(&*context, variable) {
                Membership::Sure => num_sure += 1,
                Membership::Possible => {
                    let _ = context.set_insert(self.possible, index);
                }
                Membership::Impossible => {}
            }
        }

        context.assign(self.num_sure, num_sure);
    }

    fn count_bounds(&self, domains: &impl ReadDomains) -> (i32, i32) {
        let num_sure = domains.value(self.num_sure) as i32;
        (num_sure, num_sure + domains.set_len(self.possible) as i32)
    }

    fn filter(&self, mut context: PropagationContextMut) -> PropagationStatus {
        let (min_count, max_count) = self.count_bounds(&context);

        if context.upper_bound(&self.counter) < min_count
            || context.lower_bound(&self.counter) > max_count
        {
            return Err(context.conflict("the counter is outside of the achievable counts"));
        }

        let _ = context.set_lower_bound(&self.counter, min_count)?;
        let _ = context.set_upper_bound(&self.counter, max_count)?;

        if self.options.back_propagation == AmongBackPropagation::Disabled
            || !context.is_fixed(&self.counter)
            || min_count == max_count
        {
            return Ok(());
        }

        let count = context.lower_bound(&self.counter);
        if count == min_count {
            self.exclude_possible(&mut context)?;
        } else if count == max_count {
            self.include_possible(&mut context)?;
        }

        Ok(())
    }

    /// Every possible variable has to take a value outside of the tracked values.
    fn exclude_possible(&self, context: &mut PropagationContextMut) -> PropagationStatus {
        let (Some(&smallest), Some(&largest)) = (self.values.first(), self.values.last()) else {
            return Ok(());
        };

        for index in context.set_iter(self.possible).collect::<Vec<_>>() {
            let variable = &self.variables[index];
            trace!("{variable} cannot take a value in {:?}", self.values);

            if context.has_enumerated_domain(variable) {
                for &value in self.values.iter() {
                    let _ = context.remove(variable, value)?;
                }
                let _ = context.set_remove(self.possible, index);
            } else {
                let (lower, upper) = shrink_inward(&*context, variable, |value| {
                    self.value_set.contains(&value)
                });
                let _ = context.set_lower_bound(variable, lower)?;
                let _ = context.set_upper_bound(variable, upper)?;

                if lower > largest || upper < smallest {
                    let _ = context.set_remove(self.possible, index);
                }
            }
        }

        Ok(())
    }

    /// Every possible variable has to take one of the tracked values.
    fn include_possible(&self, context: &mut PropagationContextMut) -> PropagationStatus {
        let (Some(&smallest), Some(&largest)) = (self.values.first(), self.values.last()) else {
            return Ok(());
        };

        for index in context.set_iter(self.possible).collect::<Vec<_>>() {
            let variable = &self.variables[index];
            trace!("{variable} has to take a value in {:?}", self.values);

            if context.has_enumerated_domain(variable) {
                let untracked = context
                    .iterate_domain(variable)
                    .filter(|value| !self.value_set.contains(value))
                    .collect::<Vec<_>>();
                for value in untracked {
                    let _ = context.remove(variable, value)?;
                }

                let _ = context.set_remove(self.possible, index);
                context.add_assign(self.num_sure, 1);
            } else {
                let _ = context.set_lower_bound(variable, smallest)?;
                let _ = context.set_upper_bound(variable, largest)?;

                let (lower, upper) = shrink_inward(&*context, variable, |value| {
                    !self.value_set.contains(&value)
                });
                let _ = context.set_lower_bound(variable, lower)?;
                let _ = context.set_upper_bound(variable, upper)?;

                if context.is_fixed(variable) {
                    let _ = context.set_remove(self.possible, index);
                    context.add_assign(self.num_sure, 1);
                }
            }
        }

        Ok(())
    }
}

/// The bounds of `variable` after removing the longest runs of values at either end for which
/// `remove` holds. The result is empty (`lower > upper`) if every value is removed.
fn shrink_inward<Var: IntegerVariable>(
    domains: &impl ReadDomains,
    variable: &Var,
    remove: impl Fn(i32) -> bool,
) -> (i32, i32) {
    let mut lower = domains.lower_bound(variable);
    let mut upper = domains.upper_bound(variable);

    let mut candidate = Some(lower);
    while let Some(value) = candidate.filter(|&value| value <= upper && remove(value)) {
        lower = value + 1;
        candidate = domains.next_value(variable, value);
    }

    let mut candidate = Some(upper);
    while let Some(value) = candidate.filter(|&value| value >= lower && remove(value)) {
        upper = value - 1;
        candidate = domains.previous_value(variable, value);
    }

    (lower, upper)
}

impl<Var, Counter> Propagator for AmongPropagator<Var, Counter>
where
    Var: IntegerVariable + 'static,
    Counter: IntegerVariable + 'static,
{
    fn name(&self) -> &str {
        "Among"
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn propagation_conditions(&self, local_id: LocalId) -> DomainEvents {
        if local_id == self.counter_local_id() {
            COUNTER_CONDITIONS
        } else {
            VARIABLE_CONDITIONS
        }
    }

    fn propagate(
        &mut self,
        mut context: PropagationContextMut,
        events: EnumSet<PropagationEvent>,
    ) -> PropagationStatus {
        if events.contains(PropagationEvent::Full) {
            self.initialise(&mut context);
        }

        self.filter(context)
    }

    fn propagate_event(
        &mut self,
        mut context: PropagationContextMut,
        local_id: LocalId,
        event: OpaqueDomainEvent,
    ) -> Result<EnqueueDecision, Contradiction> {
        let conditions = self.propagation_conditions(local_id).events();

        if local_id == self.counter_local_id() {
            return Ok(if (self.counter.unpack_event(event) & conditions).is_empty() {
                EnqueueDecision::Skip
            } else {
                EnqueueDecision::Enqueue
            });
        }

        let index = local_id.unpack() as usize;
        let variable = &self.variables[index];
        if (variable.unpack_event(event) & conditions).is_empty() {
            return Ok(EnqueueDecision::Skip);
        }

        if context.set_contains(self.possible, index) {
            match self.classify(&context, variable) {
                Membership::Sure => {
                    let _ = context.set_remove(self.possible, index);
                    context.add_assign(self.num_sure, 1);

                    let (min_count, _) = self.count_bounds(&context);
                    trace!("{variable} is surely tracked, {self} counts at least {min_count}");
                    let _ = context.set_lower_bound(&self.counter, min_count)?;
                }
                Membership::Impossible => {
                    let _ = context.set_remove(self.possible, index);

                    let (_, max_count) = self.count_bounds(&context);
                    trace!("{variable} is never tracked, {self} counts at most {max_count}");
                    let _ = context.set_upper_bound(&self.counter, max_count)?;
                }
                Membership::Possible => {}
            }
        }

        Ok(EnqueueDecision::Enqueue)
    }

    fn is_entailed(&self, domains: Domains) -> Entailment {
        let mut min_count = 0;
        let mut max_count = 0;
        let mut all_fixed = domains.is_fixed(&self.counter);

        for variable in self.variables.iter() {
            match self.classify(&domains, variable) {
                Membership::Sure => {
                    min_count += 1;
                    max_count += 1;
                }
                Membership::Possible => max_count += 1,
                Membership::Impossible => {}
            }
            all_fixed &= domains.is_fixed(variable);
        }

        if min_count > domains.upper_bound(&self.counter)
            || max_count < domains.lower_bound(&self.counter)
        {
            Entailment::False
        } else if all_fixed {
            Entailment::True
        } else {
            Entailment::Undefined
        }
    }
}

impl<Var, Counter> std::fmt::Display for AmongPropagator<Var, Counter>
where
    Var: IntegerVariable,
    Counter: IntegerVariable,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AMONG([{}],{{{}}},{})",
            self.variables.iter().join(","),
            self.values.iter().join(","),
            self.counter
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_solver::TestSolver;
    use crate::engine::variables::DomainId;

    fn among(
        variables: &[DomainId],
        counter: DomainId,
        values: &[i32],
    ) -> AmongArgs<DomainId, DomainId> {
        AmongArgs {
            variables: variables.into(),
            counter,
            values: values.to_vec(),
            options: AmongOptions::default(),
        }
    }

    #[test]
    fn counter_is_bounded_by_the_possible_count() {
        let mut solver = TestSolver::default();
        let variables = (0..4)
            .map(|_| solver.new_sparse_variable(vec![1, 2, 3, 4]))
            .collect::<Vec<_>>();
        let counter = solver.new_sparse_variable(vec![0, 1, 2, 3, 4]);

        let handle = solver
            .new_propagator(among(&variables, counter, &[1, 2]))
            .expect("no empty domains");

        solver.assert_bounds(counter, 0, 4);
        let propagator = solver.state.get_propagator(handle).expect("among propagator");
        assert_eq!(propagator.num_sure(solver.state.domains()), 0);
        assert_eq!(propagator.possible(solver.state.domains()), vec![0, 1, 2, 3]);
    }

    #[test]
    fn fixing_the_counter_to_the_maximum_forces_the_values() {
        let mut solver = TestSolver::default();
        let variables = (0..4)
            .map(|_| solver.new_sparse_variable(vec![1, 2, 3, 4]))
            .collect::<Vec<_>>();
        let counter = solver.new_sparse_variable(vec![0, 1, 2, 3, 4]);
        let handle = solver
            .new_propagator(among(&variables, counter, &[1, 2]))
            .expect("no empty domains");

        solver.instantiate(counter, 4);
        solver.propagate().expect("no empty domains");

        for &variable in variables.iter() {
            assert_eq!(solver.values(variable), vec![1, 2]);
        }
        let propagator = solver.state.get_propagator(handle).expect("among propagator");
        assert_eq!(propagator.num_sure(solver.state.domains()), 4);
        assert!(propagator.possible(solver.state.domains()).is_empty());
    }

    #[test]
    fn fixing_the_counter_to_the_minimum_excludes_the_values() {
        let mut solver = TestSolver::default();
        let x = solver.new_sparse_variable(vec![1, 2, 3, 4]);
        let y = solver.new_sparse_variable(vec![1, 3, 5]);
        let z = solver.new_sparse_variable(vec![2]);
        let counter = solver.new_variable(0, 3);
        let _ = solver
            .new_propagator(among(&[x, y, z], counter, &[1, 2]))
            .expect("no empty domains");
        solver.assert_bounds(counter, 1, 3);

        solver.instantiate(counter, 1);
        solver.propagate().expect("no empty domains");

        assert_eq!(solver.values(x), vec![3, 4]);
        assert_eq!(solver.values(y), vec![3, 5]);
        assert_eq!(solver.values(z), vec![2]);
    }

    #[test]
    fn mixed_domains_are_classified() {
        let mut solver = TestSolver::default();
        let x = solver.new_sparse_variable(vec![1, 2, 3, 4]);
        let y = solver.new_sparse_variable(vec![5, 6]);
        let z = solver.new_sparse_variable(vec![1]);
        let counter = solver.new_variable(0, 3);

        let handle = solver
            .new_propagator(among(&[x, y, z], counter, &[1, 2]))
            .expect("no empty domains");

        solver.assert_bounds(counter, 1, 2);
        let propagator = solver.state.get_propagator(handle).expect("among propagator");
        assert_eq!(propagator.num_sure(solver.state.domains()), 1);
        assert_eq!(propagator.possible(solver.state.domains()), vec![0]);
    }

    #[test]
    fn repeated_full_propagation_is_stable() {
        let mut solver = TestSolver::default();
        let x = solver.new_sparse_variable(vec![1, 2, 3, 4]);
        let y = solver.new_sparse_variable(vec![5, 6]);
        let z = solver.new_sparse_variable(vec![1]);
        let counter = solver.new_variable(0, 3);
        let handle = solver
            .new_propagator(among(&[x, y, z], counter, &[1, 2]))
            .expect("no empty domains");

        for _ in 0..2 {
            solver.state.force_full_propagation(handle);
            solver.propagate().expect("no empty domains");

            let propagator = solver.state.get_propagator(handle).expect("among propagator");
            assert_eq!(propagator.num_sure(solver.state.domains()), 1);
            assert_eq!(propagator.possible(solver.state.domains()), vec![0]);
            solver.assert_bounds(counter, 1, 2);
        }
    }

    #[test]
    fn events_update_the_counts_incrementally() {
        let mut solver = TestSolver::default();
        let x = solver.new_sparse_variable(vec![1, 2, 3]);
        let y = solver.new_sparse_variable(vec![2, 3, 4]);
        let counter = solver.new_variable(0, 5);
        let handle = solver
            .new_propagator(among(&[x, y], counter, &[2]))
            .expect("no empty domains");
        solver.assert_bounds(counter, 0, 2);

        solver.instantiate(x, 2);
        solver.propagate().expect("no empty domains");
        solver.assert_bounds(counter, 1, 2);

        solver.remove(y, 2);
        solver.propagate().expect("no empty domains");
        solver.assert_bounds(counter, 1, 1);

        let propagator = solver.state.get_propagator(handle).expect("among propagator");
        assert_eq!(propagator.num_sure(solver.state.domains()), 1);
        assert!(propagator.possible(solver.state.domains()).is_empty());
    }

    #[test]
    fn restoring_undoes_the_incremental_state() {
        let mut solver = TestSolver::default();
        let x = solver.new_sparse_variable(vec![1, 2, 3]);
        let y = solver.new_sparse_variable(vec![1, 2, 3]);
        let counter = solver.new_variable(0, 2);
        let handle = solver
            .new_propagator(among(&[x, y], counter, &[1]))
            .expect("no empty domains");

        solver.new_checkpoint();
        solver.instantiate(x, 1);
        solver.set_lower_bound(y, 2);
        solver.propagate().expect("no empty domains");
        solver.assert_bounds(counter, 1, 1);

        solver.restore_to(0);

        solver.assert_bounds(counter, 0, 2);
        let propagator = solver.state.get_propagator(handle).expect("among propagator");
        assert_eq!(propagator.num_sure(solver.state.domains()), 0);
        assert_eq!(propagator.possible(solver.state.domains()), vec![0, 1]);
    }

    #[test]
    fn bounded_domains_are_shrunk_past_excluded_values() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(1, 5);
        let y = solver.new_sparse_variable(vec![3]);
        let counter = solver.new_variable(0, 2);
        let _ = solver
            .new_propagator(among(&[x, y], counter, &[1, 2, 5]))
            .expect("no empty domains");

        solver.set_upper_bound(counter, 0);
        solver.propagate().expect("no empty domains");

        solver.assert_bounds(x, 3, 4);
    }

    #[test]
    fn bounded_domains_are_shrunk_onto_included_values() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(5, 9);
        let counter = solver.new_variable(1, 1);

        let _ = solver
            .new_propagator(among(&[x], counter, &[3, 4, 7]))
            .expect("no empty domains");

        solver.assert_bounds(x, 7, 7);
    }

    #[test]
    fn disabled_back_propagation_only_filters_the_counter() {
        let mut solver = TestSolver::default();
        let x = solver.new_sparse_variable(vec![1, 2, 3, 4]);
        let counter = solver.new_variable(1, 1);

        let _ = solver
            .new_propagator(AmongArgs {
                variables: vec![x].into(),
                counter,
                values: vec![1, 2],
                options: AmongOptions {
                    back_propagation: AmongBackPropagation::Disabled,
                },
            })
            .expect("no empty domains");

        assert_eq!(solver.values(x), vec![1, 2, 3, 4]);
    }

    #[test]
    fn unreachable_counts_are_a_conflict() {
        let mut solver = TestSolver::default();
        let x = solver.new_sparse_variable(vec![5, 6]);
        let counter = solver.new_variable(1, 3);

        let result = solver.new_propagator(among(&[x], counter, &[1, 2]));

        assert!(matches!(result, Err(Contradiction::Conflict { .. })));
    }

    #[test]
    fn entailment_is_decided_from_the_domains() {
        let mut solver = TestSolver::default();
        let x = solver.new_sparse_variable(vec![1, 3]);
        let y = solver.new_sparse_variable(vec![2]);
        let counter = solver.new_variable(0, 2);
        let handle = solver.state.add_propagator(among(&[x, y], counter, &[1, 2]));

        assert_eq!(solver.state.is_entailed(handle), Entailment::Undefined);

        solver.set_lower_bound(counter, 2);
        solver.remove(x, 1);
        assert_eq!(solver.state.is_entailed(handle), Entailment::False);
    }

    #[test]
    fn fixed_and_consistent_is_entailed() {
        let mut solver = TestSolver::default();
        let x = solver.new_sparse_variable(vec![1]);
        let y = solver.new_sparse_variable(vec![4]);
        let counter = solver.new_variable(1, 1);
        let handle = solver.state.add_propagator(among(&[x, y], counter, &[1, 2]));

        assert_eq!(solver.state.is_entailed(handle), Entailment::True);
    }

    #[test]
    fn display_lists_the_scope() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 3);
        let y = solver.new_variable(0, 3);
        let counter = solver.new_variable(0, 2);
        let handle = solver.state.add_propagator(among(&[x, y], counter, &[2, 1, 2]));

        let propagator = solver.state.get_propagator(handle).expect("among propagator");
        assert_eq!(propagator.to_string(), "AMONG([x0,x1],{1,2},x2)");
    }
}
