use crate::engine::variables::IntegerVariable;
use crate::engine::Assignments;
use crate::engine::TrailedInteger;
use crate::engine::TrailedSet;
use crate::engine::TrailedValues;

/// A read-only view of the variable domains and the trailed values.
///
/// Queries are available through [`ReadDomains`].
#[derive(Clone, Copy, Debug)]
pub struct Domains<'a> {
    pub(crate) assignments: &'a Assignments,
    pub(crate) trailed_values: &'a TrailedValues,
}

impl<'a> Domains<'a> {
    pub(crate) fn new(assignments: &'a Assignments, trailed_values: &'a TrailedValues) -> Self {
        Domains {
            assignments,
            trailed_values,
        }
    }
}

/// A trait which defines common methods for retrieving the [`Assignments`] and the
/// [`TrailedValues`] from the structure which implements this trait.
pub trait HasAssignments {
    /// Returns the stored [`Assignments`].
    fn assignments(&self) -> &Assignments;

    /// Returns the stored [`TrailedValues`].
    fn trailed_values(&self) -> &TrailedValues;
}

impl HasAssignments for Domains<'_> {
    fn assignments(&self) -> &Assignments {
        self.assignments
    }

    fn trailed_values(&self) -> &TrailedValues {
        self.trailed_values
    }
}

/// Queries on the domains of variables and on trailed values, available on every context
/// handed to a propagator.
pub trait ReadDomains: HasAssignments {
    /// Returns `true` if the domain of the given variable is singleton.
    fn is_fixed<Var: IntegerVariable>(&self, var: &Var) -> bool {
        var.is_fixed(self.assignments())
    }

    fn lower_bound<Var: IntegerVariable>(&self, var: &Var) -> i32 {
        var.lower_bound(self.assignments())
    }

    fn upper_bound<Var: IntegerVariable>(&self, var: &Var) -> i32 {
        var.upper_bound(self.assignments())
    }

    fn contains<Var: IntegerVariable>(&self, var: &Var, value: i32) -> bool {
        var.contains(self.assignments(), value)
    }

    fn size<Var: IntegerVariable>(&self, var: &Var) -> usize {
        var.size(self.assignments())
    }

    /// The smallest value in the domain which is larger than `value`.
    fn next_value<Var: IntegerVariable>(&self, var: &Var, value: i32) -> Option<i32> {
        var.next_value(self.assignments(), value)
    }

    /// The largest value in the domain which is smaller than `value`.
    fn previous_value<Var: IntegerVariable>(&self, var: &Var, value: i32) -> Option<i32> {
        var.previous_value(self.assignments(), value)
    }

    fn has_enumerated_domain<Var: IntegerVariable>(&self, var: &Var) -> bool {
        var.has_enumerated_domain(self.assignments())
    }

    fn iterate_domain<Var: IntegerVariable>(&self, var: &Var) -> impl Iterator<Item = i32> {
        var.iterate_domain(self.assignments())
    }

    fn iterate_ranges<Var: IntegerVariable>(&self, var: &Var) -> impl Iterator<Item = (i32, i32)> {
        var.iterate_ranges(self.assignments())
    }

    fn value(&self, trailed_integer: TrailedInteger) -> i64 {
        self.trailed_values().read(trailed_integer)
    }

    fn set_contains(&self, set: TrailedSet, element: usize) -> bool {
        self.trailed_values().set_contains(set, element)
    }

    fn set_len(&self, set: TrailedSet) -> usize {
        self.trailed_values().set_len(set)
    }

    fn set_iter(&self, set: TrailedSet) -> impl Iterator<Item = usize> {
        self.trailed_values().set_iter(set)
    }
}

impl<T: HasAssignments> ReadDomains for T {}
