use crate::basic_types::Cause;
use crate::basic_types::Contradiction;
use crate::basic_types::EmptyDomain;
use crate::engine::variables::IntegerVariable;
use crate::engine::Assignments;
use crate::engine::TrailedInteger;
use crate::engine::TrailedSet;
use crate::engine::TrailedValues;
use crate::propagation::Domains;
use crate::propagation::HasAssignments;
#[cfg(doc)]
use crate::propagation::Propagator;
use crate::propagation::PropagatorId;
#[cfg(doc)]
use crate::propagation::ReadDomains;

/// Provides information about the state of the solver to a propagator.
///
/// Domains can be read through the implementation of [`ReadDomains`], and changes to the domains
/// are made through the mutation methods, which attribute every change to the propagator. A
/// mutation which would empty a domain is refused and reported as
/// [`Contradiction::EmptyDomain`]; at that point no more propagation should happen.
#[derive(Debug)]
pub struct PropagationContextMut<'a> {
    pub(crate) trailed_values: &'a mut TrailedValues,
    pub(crate) assignments: &'a mut Assignments,
    pub(crate) propagator_id: PropagatorId,
}

impl HasAssignments for PropagationContextMut<'_> {
    fn assignments(&self) -> &Assignments {
        self.assignments
    }

    fn trailed_values(&self) -> &TrailedValues {
        self.trailed_values
    }
}

impl<'a> PropagationContextMut<'a> {
    pub(crate) fn new(
        trailed_values: &'a mut TrailedValues,
        assignments: &'a mut Assignments,
        propagator_id: PropagatorId,
    ) -> Self {
        PropagationContextMut {
            trailed_values,
            assignments,
            propagator_id,
        }
    }

    /// Get the current domain information.
    pub fn domains(&self) -> Domains<'_> {
        Domains::new(self.assignments, self.trailed_values)
    }

    pub fn reborrow(&mut self) -> PropagationContextMut<'_> {
        PropagationContextMut {
            trailed_values: self.trailed_values,
            assignments: self.assignments,
            propagator_id: self.propagator_id,
        }
    }

    /// The [`Cause`] under which changes made through this context are recorded.
    pub fn cause(&self) -> Cause {
        Cause::Propagator(self.propagator_id)
    }

    /// Create the [`Contradiction`] which reports that the [`Propagator`] found the current
    /// domains to be inconsistent.
    pub fn conflict(&self, message: &'static str) -> Contradiction {
        Contradiction::Conflict {
            cause: self.cause(),
            message,
        }
    }

    fn lift(&self, result: Result<bool, EmptyDomain>) -> Result<bool, Contradiction> {
        result.map_err(|EmptyDomain| Contradiction::EmptyDomain { cause: self.cause() })
    }

    /// Returns whether the domain changed.
    pub fn set_lower_bound<Var: IntegerVariable>(
        &mut self,
        var: &Var,
        bound: i32,
    ) -> Result<bool, Contradiction> {
        let cause = self.cause();
        let result = var.update_lower_bound(self.assignments, bound, cause);
        self.lift(result)
    }

    /// Returns whether the domain changed.
    pub fn set_upper_bound<Var: IntegerVariable>(
        &mut self,
        var: &Var,
        bound: i32,
    ) -> Result<bool, Contradiction> {
        let cause = self.cause();
        let result = var.update_upper_bound(self.assignments, bound, cause);
        self.lift(result)
    }

    pub fn remove<Var: IntegerVariable>(
        &mut self,
        var: &Var,
        value: i32,
    ) -> Result<bool, Contradiction> {
        let cause = self.cause();
        let result = var.remove_value(self.assignments, value, cause);
        self.lift(result)
    }

    /// Remove every value in `[lower, upper]`.
    pub fn remove_interval<Var: IntegerVariable>(
        &mut self,
        var: &Var,
        lower: i32,
        upper: i32,
    ) -> Result<bool, Contradiction> {
        let cause = self.cause();
        let result = var.remove_interval(self.assignments, lower, upper, cause);
        self.lift(result)
    }

    pub fn instantiate<Var: IntegerVariable>(
        &mut self,
        var: &Var,
        value: i32,
    ) -> Result<bool, Contradiction> {
        let cause = self.cause();
        let result = var.instantiate_to(self.assignments, value, cause);
        self.lift(result)
    }

    pub fn assign(&mut self, trailed_integer: TrailedInteger, value: i64) {
        self.trailed_values.assign(trailed_integer, value);
    }

    pub fn add_assign(&mut self, trailed_integer: TrailedInteger, addition: i64) {
        self.trailed_values.add_assign(trailed_integer, addition);
    }

    /// Returns whether the element was absent.
    pub fn set_insert(&mut self, set: TrailedSet, element: usize) -> bool {
        self.trailed_values.set_insert(set, element)
    }

    /// Returns whether the element was present.
    pub fn set_remove(&mut self, set: TrailedSet, element: usize) -> bool {
        self.trailed_values.set_remove(set, element)
    }

    pub fn set_clear(&mut self, set: TrailedSet) {
        self.trailed_values.set_clear(set);
    }
}
