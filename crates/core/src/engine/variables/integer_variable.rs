use std::fmt::Debug;
use std::fmt::Display;

use enumset::EnumSet;

use crate::basic_types::Cause;
use crate::basic_types::EmptyDomain;
use crate::engine::notifications::DomainEvent;
use crate::engine::notifications::OpaqueDomainEvent;
use crate::engine::notifications::Watchers;
use crate::engine::Assignments;
use crate::propcore_assert_simple;

/// A trait specifying the required behaviour of an integer variable such as retrieving a
/// lower-bound ([`IntegerVariable::lower_bound`]).
///
/// A variable is either a [`super::DomainId`], which owns a domain in the [`Assignments`], or a
/// view which derives its domain from another variable. All mutations return whether the domain
/// changed, or [`EmptyDomain`] if the mutation would leave no values.
pub trait IntegerVariable: Clone + Debug + Display {
    /// Get the lower bound of the variable.
    fn lower_bound(&self, assignments: &Assignments) -> i32;

    /// Get the upper bound of the variable.
    fn upper_bound(&self, assignments: &Assignments) -> i32;

    /// Determine whether the value is in the domain of this variable.
    fn contains(&self, assignments: &Assignments, value: i32) -> bool;

    /// The number of values in the domain.
    fn size(&self, assignments: &Assignments) -> usize;

    fn is_fixed(&self, assignments: &Assignments) -> bool {
        self.lower_bound(assignments) == self.upper_bound(assignments)
    }

    /// The value of a fixed variable. Calling this on a variable which is not fixed is a
    /// programming error.
    fn fixed_value(&self, assignments: &Assignments) -> i32 {
        propcore_assert_simple!(
            self.is_fixed(assignments),
            "{self} is not fixed, so it has no value"
        );
        self.lower_bound(assignments)
    }

    /// Whether the variable tracks holes in its domain, or only its bounds.
    fn has_enumerated_domain(&self, assignments: &Assignments) -> bool;

    /// The smallest value in the domain which is larger than `value`.
    fn next_value(&self, assignments: &Assignments, value: i32) -> Option<i32>;

    /// The largest value in the domain which is smaller than `value`.
    fn previous_value(&self, assignments: &Assignments, value: i32) -> Option<i32>;

    /// Iterate over the values of the domain in increasing order.
    fn iterate_domain(&self, assignments: &Assignments) -> impl Iterator<Item = i32>;

    /// Iterate over the values of the domain in decreasing order.
    fn iterate_domain_rev(&self, assignments: &Assignments) -> impl Iterator<Item = i32>;

    /// Iterate over the maximal runs of consecutive values `(min, max)` in increasing order.
    fn iterate_ranges(&self, assignments: &Assignments) -> impl Iterator<Item = (i32, i32)>;

    /// Iterate over the maximal runs of consecutive values `(min, max)` in decreasing order.
    fn iterate_ranges_rev(&self, assignments: &Assignments) -> impl Iterator<Item = (i32, i32)>;

    fn update_lower_bound(
        &self,
        assignments: &mut Assignments,
        value: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain>;

    fn update_upper_bound(
        &self,
        assignments: &mut Assignments,
        value: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain>;

    fn remove_value(
        &self,
        assignments: &mut Assignments,
        value: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain>;

    /// Remove every value in `[lower, upper]`.
    fn remove_interval(
        &self,
        assignments: &mut Assignments,
        lower: i32,
        upper: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain>;

    fn instantiate_to(
        &self,
        assignments: &mut Assignments,
        value: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain>;

    /// The values which left the domain after the domain trail had length `trail_position`.
    fn removed_values_since(
        &self,
        assignments: &Assignments,
        trail_position: usize,
    ) -> impl Iterator<Item = i32>;

    /// Register a watch for this variable on the given domain events.
    fn watch_all(&self, watchers: &mut Watchers<'_>, events: EnumSet<DomainEvent>);

    /// Decode a domain event for this variable.
    fn unpack_event(&self, event: OpaqueDomainEvent) -> EnumSet<DomainEvent>;
}
