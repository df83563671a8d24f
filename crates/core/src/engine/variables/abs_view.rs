use std::fmt::Display;

use enumset::EnumSet;
use itertools::Itertools;

use crate::basic_types::Cause;
use crate::basic_types::EmptyDomain;
use crate::engine::notifications::DomainEvent;
use crate::engine::notifications::OpaqueDomainEvent;
use crate::engine::notifications::Watchers;
use crate::engine::variables::IntegerVariable;
use crate::engine::Assignments;

/// Models the constraint `y = |x|`, by expressing the domain of `y` as a transformation of the
/// domain of `x`.
///
/// The view owns no domain; every query is answered from the domain of `x` and every mutation is
/// translated into mutations of `x`. Removals from a bounded `x` which do not touch its bounds are
/// ignored, so e.g. raising the lower bound of `|x|` with `x ∈ [-5, 5]` has no effect.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct AbsView<Inner> {
    inner: Inner,
}

impl<Inner> AbsView<Inner> {
    pub fn new(inner: Inner) -> Self {
        AbsView { inner }
    }

    pub fn inner(&self) -> &Inner {
        &self.inner
    }
}

impl<Inner: IntegerVariable> AbsView<Inner> {
    /// Render the view together with its current bounds, e.g. `|x0| = [1,4]`.
    pub fn describe(&self, assignments: &Assignments) -> String {
        format!(
            "{self} = [{},{}]",
            self.lower_bound(assignments),
            self.upper_bound(assignments)
        )
    }
}

impl<Inner: IntegerVariable> IntegerVariable for AbsView<Inner> {
    fn lower_bound(&self, assignments: &Assignments) -> i32 {
        if self.inner.contains(assignments, 0) {
            return 0;
        }

        let lower_bound = self.inner.lower_bound(assignments);
        let upper_bound = self.inner.upper_bound(assignments);
        if lower_bound > 0 {
            lower_bound
        } else if upper_bound < 0 {
            -upper_bound
        } else {
            // The domain of the inner variable straddles zero without containing it.
            let above = self.inner.next_value(assignments, 0).unwrap_or(upper_bound);
            let below = self
                .inner
                .previous_value(assignments, 0)
                .unwrap_or(lower_bound);
            above.min(-below)
        }
    }

    fn upper_bound(&self, assignments: &Assignments) -> i32 {
        let lower_bound = self.inner.lower_bound(assignments);
        let upper_bound = self.inner.upper_bound(assignments);
        (-lower_bound).max(upper_bound)
    }

    fn contains(&self, assignments: &Assignments, value: i32) -> bool {
        value >= 0
            && (self.inner.contains(assignments, value) || self.inner.contains(assignments, -value))
    }

    fn size(&self, assignments: &Assignments) -> usize {
        self.iterate_domain(assignments).count()
    }

    fn has_enumerated_domain(&self, assignments: &Assignments) -> bool {
        self.inner.has_enumerated_domain(assignments)
    }

    fn next_value(&self, assignments: &Assignments, value: i32) -> Option<i32> {
        if value < 0 {
            return Some(self.lower_bound(assignments));
        }

        let above = self.inner.next_value(assignments, value);
        let below = self
            .inner
            .previous_value(assignments, -value)
            .map(|below| -below);
        above.into_iter().chain(below).min()
    }

    fn previous_value(&self, assignments: &Assignments, value: i32) -> Option<i32> {
        if value <= 0 {
            return None;
        }

        let above = self
            .inner
            .previous_value(assignments, value)
            .filter(|&above| above >= 0);
        let below = self
            .inner
            .next_value(assignments, -value)
            .filter(|&below| below <= 0)
            .map(|below| -below);
        above.into_iter().chain(below).max()
    }

    fn iterate_domain(&self, assignments: &Assignments) -> impl Iterator<Item = i32> {
        AbsValues::ascending(self.inner.clone(), assignments)
    }

    fn iterate_domain_rev(&self, assignments: &Assignments) -> impl Iterator<Item = i32> {
        AbsValues::descending(self.inner.clone(), assignments)
    }

    fn iterate_ranges(&self, assignments: &Assignments) -> impl Iterator<Item = (i32, i32)> {
        let positive = self
            .inner
            .iterate_ranges(assignments)
            .filter(|&(_, max)| max >= 0)
            .map(|(min, max)| (min.max(0), max));
        let negative = self
            .inner
            .iterate_ranges_rev(assignments)
            .filter(|&(min, _)| min < 0)
            .map(|(min, max)| (-max.min(0), -min));

        positive
            .merge_by(negative, |first, second| first.0 <= second.0)
            .coalesce(|current, next| {
                if next.0 <= current.1 + 1 {
                    Ok((current.0, current.1.max(next.1)))
                } else {
                    Err((current, next))
                }
            })
    }

    fn iterate_ranges_rev(&self, assignments: &Assignments) -> impl Iterator<Item = (i32, i32)> {
        let positive = self
            .inner
            .iterate_ranges_rev(assignments)
            .filter(|&(_, max)| max >= 0)
            .map(|(min, max)| (min.max(0), max));
        let negative = self
            .inner
            .iterate_ranges(assignments)
            .filter(|&(min, _)| min < 0)
            .map(|(min, max)| (-max.min(0), -min));

        positive
            .merge_by(negative, |first, second| first.1 >= second.1)
            .coalesce(|current, next| {
                if next.1 + 1 >= current.0 {
                    Ok((current.0.min(next.0), current.1))
                } else {
                    Err((current, next))
                }
            })
    }

    fn update_lower_bound(
        &self,
        assignments: &mut Assignments,
        value: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain> {
        if value <= self.lower_bound(assignments) {
            return Ok(false);
        }
        if value > self.upper_bound(assignments) {
            return Err(EmptyDomain);
        }

        self.inner
            .remove_interval(assignments, -value + 1, value - 1, cause)
    }

    fn update_upper_bound(
        &self,
        assignments: &mut Assignments,
        value: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain> {
        if value < 0 || value < self.lower_bound(assignments) {
            return Err(EmptyDomain);
        }
        if value >= self.upper_bound(assignments) {
            return Ok(false);
        }

        let upper_changed = self.inner.update_upper_bound(assignments, value, cause)?;
        let lower_changed = self.inner.update_lower_bound(assignments, -value, cause)?;
        Ok(upper_changed || lower_changed)
    }

    fn remove_value(
        &self,
        assignments: &mut Assignments,
        value: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain> {
        if !self.contains(assignments, value) {
            return Ok(false);
        }
        if self.is_fixed(assignments) {
            return Err(EmptyDomain);
        }

        let positive_removed = self.inner.remove_value(assignments, value, cause)?;
        let negative_removed = value != 0 && self.inner.remove_value(assignments, -value, cause)?;
        Ok(positive_removed || negative_removed)
    }

    fn remove_interval(
        &self,
        assignments: &mut Assignments,
        lower: i32,
        upper: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain> {
        if upper < 0 || lower > upper {
            return Ok(false);
        }

        let lower = lower.max(0);
        if lower <= self.lower_bound(assignments) && self.upper_bound(assignments) <= upper {
            return Err(EmptyDomain);
        }

        let positive_removed = self
            .inner
            .remove_interval(assignments, lower, upper, cause)?;
        let negative_removed = self
            .inner
            .remove_interval(assignments, -upper, -lower, cause)?;
        Ok(positive_removed || negative_removed)
    }

    fn instantiate_to(
        &self,
        assignments: &mut Assignments,
        value: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain> {
        if !self.contains(assignments, value) {
            return Err(EmptyDomain);
        }
        if value == 0 {
            return self.inner.instantiate_to(assignments, 0, cause);
        }

        let upper_changed = self.inner.update_upper_bound(assignments, value, cause)?;
        let lower_changed = self.inner.update_lower_bound(assignments, -value, cause)?;
        let interior_removed = self
            .inner
            .remove_interval(assignments, -value + 1, value - 1, cause)?;
        Ok(upper_changed || lower_changed || interior_removed)
    }

    fn removed_values_since(
        &self,
        assignments: &Assignments,
        trail_position: usize,
    ) -> impl Iterator<Item = i32> {
        // A base removal of `x` only removes `|x|` from the view once `-x` is gone as well.
        let mut removed = self
            .inner
            .removed_values_since(assignments, trail_position)
            .map(i32::abs)
            .filter(|&value| !self.contains(assignments, value))
            .collect::<Vec<_>>();
        removed.sort_unstable();
        removed.dedup();
        removed.into_iter()
    }

    fn watch_all(&self, watchers: &mut Watchers<'_>, events: EnumSet<DomainEvent>) {
        // Any change to the inner domain can move any of the bounds of the view.
        if !events.is_empty() {
            self.inner.watch_all(watchers, EnumSet::all());
        }
    }

    fn unpack_event(&self, event: OpaqueDomainEvent) -> EnumSet<DomainEvent> {
        if self.inner.unpack_event(event).is_empty() {
            EnumSet::empty()
        } else {
            EnumSet::all()
        }
    }
}

impl<Inner: Display> Display for AbsView<Inner> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "|{}|", self.inner)
    }
}

/// Enumerates the values of an [`AbsView`] by merging two cursors over the inner domain: one
/// which walks the non-negative values away from zero, and one which walks the negative values
/// away from zero. Values reached by both cursors are reported once.
#[derive(Debug)]
struct AbsValues<'a, Inner> {
    inner: Inner,
    assignments: &'a Assignments,
    /// The next non-negative inner value.
    positive: Option<i32>,
    /// The next negative inner value.
    negative: Option<i32>,
    ascending: bool,
}

impl<'a, Inner: IntegerVariable> AbsValues<'a, Inner> {
    fn ascending(inner: Inner, assignments: &'a Assignments) -> Self {
        let positive = if inner.contains(assignments, 0) {
            Some(0)
        } else {
            inner.next_value(assignments, 0)
        };
        let negative = inner.previous_value(assignments, 0);

        AbsValues {
            inner,
            assignments,
            positive,
            negative,
            ascending: true,
        }
    }

    fn descending(inner: Inner, assignments: &'a Assignments) -> Self {
        let upper_bound = inner.upper_bound(assignments);
        let lower_bound = inner.lower_bound(assignments);

        AbsValues {
            positive: (upper_bound >= 0).then_some(upper_bound),
            negative: (lower_bound < 0).then_some(lower_bound),
            inner,
            assignments,
            ascending: false,
        }
    }

    fn advance_positive(&self, value: i32) -> Option<i32> {
        if self.ascending {
            self.inner.next_value(self.assignments, value)
        } else {
            self.inner
                .previous_value(self.assignments, value)
                .filter(|&previous| previous >= 0)
        }
    }

    fn advance_negative(&self, value: i32) -> Option<i32> {
        if self.ascending {
            self.inner.previous_value(self.assignments, value)
        } else {
            self.inner
                .next_value(self.assignments, value)
                .filter(|&next| next < 0)
        }
    }
}

impl<Inner: IntegerVariable> Iterator for AbsValues<'_, Inner> {
    type Item = i32;

    fn next(&mut self) -> Option<Self::Item> {
        let from_positive = self.positive;
        let from_negative = self.negative.map(|value| -value);

        let next = match (from_positive, from_negative) {
            (None, None) => return None,
            (Some(value), None) | (None, Some(value)) => value,
            (Some(positive), Some(negative)) if self.ascending => positive.min(negative),
            (Some(positive), Some(negative)) => positive.max(negative),
        };

        if from_positive == Some(next) {
            self.positive = self.advance_positive(next);
        }
        if from_negative == Some(next) {
            self.negative = self.advance_negative(-next);
        }

        Some(next)
    }
}
