use enumset::EnumSet;
use itertools::Either;

use crate::basic_types::Cause;
use crate::basic_types::EmptyDomain;
use crate::basic_types::Trail;
use crate::containers::KeyedVec;
use crate::engine::notifications::DomainEvent;
use crate::engine::variables::DomainId;
use crate::propcore_assert_moderate;
use crate::propcore_assert_simple;

/// Stores the domains of all integer variables together with the trail needed to restore them.
///
/// Every operation which would leave a domain empty is refused with [`EmptyDomain`] and leaves
/// the domain untouched. Every successful change records the [`DomainEvent`]s it caused, which
/// are later drained by the notification engine.
#[derive(Clone, Debug, Default)]
pub struct Assignments {
    domains: KeyedVec<DomainId, IntegerDomain>,
    trail: Trail<DomainChange>,
    events: Vec<(DomainId, EnumSet<DomainEvent>, Cause)>,
}

/// The undo record of a single domain change.
#[derive(Clone, Copy, Debug)]
struct DomainChange {
    domain: DomainId,
    old_lower_bound: i32,
    old_upper_bound: i32,
    new_lower_bound: i32,
    new_upper_bound: i32,
    old_size: usize,
    /// Set when a value strictly between the bounds was removed.
    removed_value: Option<i32>,
}

impl Assignments {
    /// Create a new bounded domain `[lower_bound, upper_bound]`.
    pub(crate) fn grow(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        propcore_assert_simple!(
            lower_bound <= upper_bound,
            "cannot create the empty domain [{lower_bound}, {upper_bound}]"
        );

        self.domains
            .push(IntegerDomain::bounded(lower_bound, upper_bound))
    }

    /// Create a new enumerated domain which contains exactly the given values.
    pub(crate) fn create_new_integer_variable_sparse(&mut self, mut values: Vec<i32>) -> DomainId {
        propcore_assert_simple!(
            !values.is_empty(),
            "cannot create a variable with an empty domain"
        );

        values.sort_unstable();
        values.dedup();

        self.domains.push(IntegerDomain::enumerated(&values))
    }

    pub(crate) fn num_domains(&self) -> usize {
        self.domains.len()
    }

    pub(crate) fn get_checkpoint(&self) -> usize {
        self.trail.get_checkpoint()
    }

    pub(crate) fn new_checkpoint(&mut self) {
        self.trail.new_checkpoint();
    }

    /// The number of changes recorded on the trail; used as a position for deltas.
    pub(crate) fn num_trail_entries(&self) -> usize {
        self.trail.len()
    }

    /// Undo every domain change made after `checkpoint`. Events which have not been dispatched
    /// yet are discarded.
    pub(crate) fn synchronise(&mut self, checkpoint: usize) {
        propcore_assert_simple!(checkpoint < self.get_checkpoint());

        for change in self.trail.synchronise(checkpoint) {
            let domain = &mut self.domains[change.domain];
            domain.lower_bound = change.old_lower_bound;
            domain.upper_bound = change.old_upper_bound;
            domain.size = change.old_size;

            if let Some(value) = change.removed_value {
                domain.set_present(value, true);
            }
        }

        self.events.clear();
    }

    /// Drain the events of all changes since the previous call.
    pub(crate) fn drain_domain_events(
        &mut self,
    ) -> impl Iterator<Item = (DomainId, EnumSet<DomainEvent>, Cause)> + '_ {
        self.events.drain(..)
    }
}

/// Queries.
impl Assignments {
    pub(crate) fn get_lower_bound(&self, domain_id: DomainId) -> i32 {
        self.domains[domain_id].lower_bound
    }

    pub(crate) fn get_upper_bound(&self, domain_id: DomainId) -> i32 {
        self.domains[domain_id].upper_bound
    }

    pub(crate) fn get_domain_size(&self, domain_id: DomainId) -> usize {
        self.domains[domain_id].size
    }

    pub(crate) fn is_value_in_domain(&self, domain_id: DomainId, value: i32) -> bool {
        self.domains[domain_id].contains(value)
    }

    pub(crate) fn is_enumerated(&self, domain_id: DomainId) -> bool {
        self.domains[domain_id].kind == DomainKind::Enumerated
    }

    pub(crate) fn next_value(&self, domain_id: DomainId, value: i32) -> Option<i32> {
        self.domains[domain_id].next_value(value)
    }

    pub(crate) fn previous_value(&self, domain_id: DomainId, value: i32) -> Option<i32> {
        self.domains[domain_id].previous_value(value)
    }

    pub(crate) fn get_domain_iterator(
        &self,
        domain_id: DomainId,
    ) -> impl DoubleEndedIterator<Item = i32> + '_ {
        let domain = &self.domains[domain_id];
        (domain.lower_bound..=domain.upper_bound).filter(move |&value| domain.is_present(value))
    }

    pub(crate) fn get_range_iterator(
        &self,
        domain_id: DomainId,
    ) -> impl Iterator<Item = (i32, i32)> + '_ {
        let domain = &self.domains[domain_id];
        let mut next_start = Some(domain.lower_bound);

        std::iter::from_fn(move || {
            let start = next_start?;
            let end = domain.end_of_run(start);
            next_start = domain.next_value(end);
            Some((start, end))
        })
    }

    pub(crate) fn get_reverse_range_iterator(
        &self,
        domain_id: DomainId,
    ) -> impl Iterator<Item = (i32, i32)> + '_ {
        let domain = &self.domains[domain_id];
        let mut next_end = Some(domain.upper_bound);

        std::iter::from_fn(move || {
            let end = next_end?;
            let start = domain.start_of_run(end);
            next_end = domain.previous_value(start);
            Some((start, end))
        })
    }

    /// The values removed from the domain since the trail had length `trail_position`.
    ///
    /// If the trail has since been restored below `trail_position`, only the changes which are
    /// still on the trail are reported.
    pub(crate) fn removed_values_since(
        &self,
        domain_id: DomainId,
        trail_position: usize,
    ) -> impl Iterator<Item = i32> + '_ {
        let domain = &self.domains[domain_id];
        let start = trail_position.min(self.trail.len());

        self.trail[start..]
            .iter()
            .filter(move |change| change.domain == domain_id)
            .flat_map(move |change| match change.removed_value {
                Some(value) => Either::Left(std::iter::once(value)),
                None => Either::Right(
                    (change.old_lower_bound..change.new_lower_bound)
                        .chain(
                            (change.new_upper_bound..change.old_upper_bound).map(|value| value + 1),
                        )
                        .filter(move |&value| domain.is_present(value)),
                ),
            })
    }
}

/// Domain operations. All of them return whether the domain changed.
impl Assignments {
    pub(crate) fn tighten_lower_bound(
        &mut self,
        domain_id: DomainId,
        new_lower_bound: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain> {
        let domain = &self.domains[domain_id];
        if new_lower_bound <= domain.lower_bound {
            return Ok(false);
        }
        if new_lower_bound > domain.upper_bound {
            return Err(EmptyDomain);
        }

        let new_lower_bound = domain.start_of_present(new_lower_bound);
        let upper_bound = domain.upper_bound;
        self.change_bounds(domain_id, new_lower_bound, upper_bound, cause);
        Ok(true)
    }

    pub(crate) fn tighten_upper_bound(
        &mut self,
        domain_id: DomainId,
        new_upper_bound: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain> {
        let domain = &self.domains[domain_id];
        if new_upper_bound >= domain.upper_bound {
            return Ok(false);
        }
        if new_upper_bound < domain.lower_bound {
            return Err(EmptyDomain);
        }

        let new_upper_bound = domain.end_of_present(new_upper_bound);
        let lower_bound = domain.lower_bound;
        self.change_bounds(domain_id, lower_bound, new_upper_bound, cause);
        Ok(true)
    }

    pub(crate) fn make_assignment(
        &mut self,
        domain_id: DomainId,
        value: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain> {
        let domain = &self.domains[domain_id];
        if !domain.contains(value) {
            return Err(EmptyDomain);
        }
        if domain.lower_bound == domain.upper_bound {
            return Ok(false);
        }

        self.change_bounds(domain_id, value, value, cause);
        Ok(true)
    }

    /// Remove a single value. Bounded domains can only lose their bounds; removing a value
    /// strictly between the bounds of a bounded domain has no effect.
    pub(crate) fn remove_value_from_domain(
        &mut self,
        domain_id: DomainId,
        value: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain> {
        let domain = &self.domains[domain_id];
        if !domain.contains(value) {
            return Ok(false);
        }
        if domain.lower_bound == domain.upper_bound {
            return Err(EmptyDomain);
        }

        if value == domain.lower_bound {
            self.tighten_lower_bound(domain_id, value + 1, cause)
        } else if value == domain.upper_bound {
            self.tighten_upper_bound(domain_id, value - 1, cause)
        } else if domain.kind == DomainKind::Bounded {
            Ok(false)
        } else {
            self.remove_interior_value(domain_id, value, cause);
            Ok(true)
        }
    }

    /// Remove all values in `[lower, upper]`, with the same restrictions on bounded domains as
    /// [`Assignments::remove_value_from_domain`].
    pub(crate) fn remove_interval_from_domain(
        &mut self,
        domain_id: DomainId,
        lower: i32,
        upper: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain> {
        let domain = &self.domains[domain_id];
        if lower > upper || upper < domain.lower_bound || lower > domain.upper_bound {
            return Ok(false);
        }
        if lower <= domain.lower_bound && upper >= domain.upper_bound {
            return Err(EmptyDomain);
        }

        if lower <= domain.lower_bound {
            self.tighten_lower_bound(domain_id, upper + 1, cause)
        } else if upper >= domain.upper_bound {
            self.tighten_upper_bound(domain_id, lower - 1, cause)
        } else if domain.kind == DomainKind::Bounded {
            Ok(false)
        } else {
            let removed = (lower..=upper)
                .filter(|&value| domain.is_present(value))
                .collect::<Vec<_>>();
            for &value in removed.iter() {
                self.remove_interior_value(domain_id, value, cause);
            }
            Ok(!removed.is_empty())
        }
    }

    fn change_bounds(
        &mut self,
        domain_id: DomainId,
        new_lower_bound: i32,
        new_upper_bound: i32,
        cause: Cause,
    ) {
        let domain = &mut self.domains[domain_id];
        propcore_assert_moderate!(
            domain.lower_bound <= new_lower_bound
                && new_lower_bound <= new_upper_bound
                && new_upper_bound <= domain.upper_bound
        );

        let mut removed = 0;
        if new_lower_bound > domain.lower_bound {
            removed += domain.count_present(domain.lower_bound, new_lower_bound - 1);
        }
        if new_upper_bound < domain.upper_bound {
            removed += domain.count_present(new_upper_bound + 1, domain.upper_bound);
        }
        self.trail.push(DomainChange {
            domain: domain_id,
            old_lower_bound: domain.lower_bound,
            old_upper_bound: domain.upper_bound,
            new_lower_bound,
            new_upper_bound,
            old_size: domain.size,
            removed_value: None,
        });

        let mut events = EnumSet::empty();
        if new_lower_bound > domain.lower_bound {
            events |= DomainEvent::LowerBound;
        }
        if new_upper_bound < domain.upper_bound {
            events |= DomainEvent::UpperBound;
        }
        if new_lower_bound == new_upper_bound {
            events |= DomainEvent::Assign;
        }

        domain.lower_bound = new_lower_bound;
        domain.upper_bound = new_upper_bound;
        domain.size -= removed;
        self.events.push((domain_id, events, cause));
    }

    fn remove_interior_value(&mut self, domain_id: DomainId, value: i32, cause: Cause) {
        let domain = &mut self.domains[domain_id];
        propcore_assert_moderate!(
            domain.lower_bound < value && value < domain.upper_bound && domain.is_present(value)
        );

        self.trail.push(DomainChange {
            domain: domain_id,
            old_lower_bound: domain.lower_bound,
            old_upper_bound: domain.upper_bound,
            new_lower_bound: domain.lower_bound,
            new_upper_bound: domain.upper_bound,
            old_size: domain.size,
            removed_value: Some(value),
        });

        domain.set_present(value, false);
        domain.size -= 1;
        self.events
            .push((domain_id, DomainEvent::Removal.into(), cause));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DomainKind {
    /// Only the bounds are stored; all values in between are in the domain.
    Bounded,
    /// Every value between the bounds is tracked individually.
    Enumerated,
}

#[derive(Clone, Debug)]
struct IntegerDomain {
    kind: DomainKind,
    lower_bound: i32,
    upper_bound: i32,
    size: usize,
    /// The smallest value the domain ever contained; `present[i]` is the membership of
    /// `offset + i`. Empty for bounded domains.
    offset: i32,
    present: Vec<bool>,
}

impl IntegerDomain {
    fn bounded(lower_bound: i32, upper_bound: i32) -> Self {
        IntegerDomain {
            kind: DomainKind::Bounded,
            lower_bound,
            upper_bound,
            size: (upper_bound as i64 - lower_bound as i64 + 1) as usize,
            offset: lower_bound,
            present: Vec::new(),
        }
    }

    /// `values` must be sorted, deduplicated and non-empty.
    fn enumerated(values: &[i32]) -> Self {
        let lower_bound = values[0];
        let upper_bound = values[values.len() - 1];
        let mut present = vec![false; (upper_bound as i64 - lower_bound as i64 + 1) as usize];
        for &value in values {
            present[(value as i64 - lower_bound as i64) as usize] = true;
        }

        IntegerDomain {
            kind: DomainKind::Enumerated,
            lower_bound,
            upper_bound,
            size: values.len(),
            offset: lower_bound,
            present,
        }
    }

    /// Membership ignoring the bounds.
    fn is_present(&self, value: i32) -> bool {
        match self.kind {
            DomainKind::Bounded => true,
            DomainKind::Enumerated => self.present[(value as i64 - self.offset as i64) as usize],
        }
    }

    fn set_present(&mut self, value: i32, is_present: bool) {
        let index = (value as i64 - self.offset as i64) as usize;
        self.present[index] = is_present;
    }

    fn contains(&self, value: i32) -> bool {
        self.lower_bound <= value && value <= self.upper_bound && self.is_present(value)
    }

    fn count_present(&self, lower: i32, upper: i32) -> usize {
        if lower > upper {
            return 0;
        }
        match self.kind {
            DomainKind::Bounded => (upper as i64 - lower as i64 + 1) as usize,
            DomainKind::Enumerated => (lower..=upper)
                .filter(|&value| self.is_present(value))
                .count(),
        }
    }

    /// The smallest present value which is at least `value`; there must be one within the
    /// bounds.
    fn start_of_present(&self, value: i32) -> i32 {
        (value..=self.upper_bound)
            .find(|&candidate| self.is_present(candidate))
            .unwrap_or(self.upper_bound)
    }

    /// The largest present value which is at most `value`; there must be one within the bounds.
    fn end_of_present(&self, value: i32) -> i32 {
        (self.lower_bound..=value)
            .rev()
            .find(|&candidate| self.is_present(candidate))
            .unwrap_or(self.lower_bound)
    }

    fn next_value(&self, value: i32) -> Option<i32> {
        if value < self.lower_bound {
            return Some(self.lower_bound);
        }
        if value >= self.upper_bound {
            return None;
        }

        (value + 1..=self.upper_bound).find(|&candidate| self.is_present(candidate))
    }

    fn previous_value(&self, value: i32) -> Option<i32> {
        if value > self.upper_bound {
            return Some(self.upper_bound);
        }
        if value <= self.lower_bound {
            return None;
        }

        (self.lower_bound..value)
            .rev()
            .find(|&candidate| self.is_present(candidate))
    }

    /// The last value of the run of consecutive values which starts at `start`.
    fn end_of_run(&self, start: i32) -> i32 {
        match self.kind {
            DomainKind::Bounded => self.upper_bound,
            DomainKind::Enumerated => {
                let mut end = start;
                while end < self.upper_bound && self.is_present(end + 1) {
                    end += 1;
                }
                end
            }
        }
    }

    /// The first value of the run of consecutive values which ends at `end`.
    fn start_of_run(&self, end: i32) -> i32 {
        match self.kind {
            DomainKind::Bounded => self.lower_bound,
            DomainKind::Enumerated => {
                let mut start = end;
                while start > self.lower_bound && self.is_present(start - 1) {
                    start -= 1;
                }
                start
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removing_a_bound_of_an_enumerated_domain_skips_holes() {
        let mut assignments = Assignments::default();
        let domain = assignments.create_new_integer_variable_sparse(vec![1, 4, 5, 9]);

        let changed = assignments
            .remove_value_from_domain(domain, 1, Cause::Decision)
            .expect("non-empty");

        assert!(changed);
        assert_eq!(assignments.get_lower_bound(domain), 4);
        assert_eq!(assignments.get_domain_size(domain), 3);
    }

    #[test]
    fn interior_removal_on_a_bounded_domain_is_ignored() {
        let mut assignments = Assignments::default();
        let domain = assignments.grow(0, 10);

        let changed = assignments
            .remove_value_from_domain(domain, 5, Cause::Decision)
            .expect("non-empty");

        assert!(!changed);
        assert!(assignments.is_value_in_domain(domain, 5));
        assert_eq!(assignments.get_domain_size(domain), 11);
    }

    #[test]
    fn operations_which_empty_a_domain_are_refused() {
        let mut assignments = Assignments::default();
        let domain = assignments.create_new_integer_variable_sparse(vec![2, 3]);

        assert_eq!(
            assignments.tighten_lower_bound(domain, 4, Cause::Decision),
            Err(EmptyDomain)
        );
        assert_eq!(
            assignments.remove_interval_from_domain(domain, 0, 3, Cause::Decision),
            Err(EmptyDomain)
        );
        assert_eq!(
            assignments.make_assignment(domain, 7, Cause::Decision),
            Err(EmptyDomain)
        );
        assert_eq!(assignments.get_domain_iterator(domain).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(assignments.drain_domain_events().count(), 0);
    }

    #[test]
    fn tightening_the_upper_bound_snaps_to_a_present_value() {
        let mut assignments = Assignments::default();
        let domain = assignments.create_new_integer_variable_sparse(vec![-3, 0, 6, 7]);

        let _ = assignments
            .tighten_upper_bound(domain, 5, Cause::Decision)
            .expect("non-empty");

        assert_eq!(assignments.get_upper_bound(domain), 0);
        assert_eq!(assignments.get_domain_size(domain), 2);
    }

    #[test]
    fn synchronise_restores_holes_and_bounds() {
        let mut assignments = Assignments::default();
        let domain = assignments.create_new_integer_variable_sparse((0..=6).collect());

        assignments.new_checkpoint();
        let _ = assignments
            .remove_value_from_domain(domain, 3, Cause::Decision)
            .expect("non-empty");
        let _ = assignments
            .tighten_lower_bound(domain, 2, Cause::Decision)
            .expect("non-empty");
        assignments.new_checkpoint();
        let _ = assignments
            .make_assignment(domain, 5, Cause::Decision)
            .expect("non-empty");

        assignments.synchronise(1);
        assert_eq!(
            assignments.get_domain_iterator(domain).collect::<Vec<_>>(),
            vec![2, 4, 5, 6]
        );
        assert_eq!(assignments.get_domain_size(domain), 4);

        assignments.synchronise(0);
        assert_eq!(
            assignments.get_domain_iterator(domain).collect::<Vec<_>>(),
            (0..=6).collect::<Vec<_>>()
        );
        assert_eq!(assignments.get_domain_size(domain), 7);
    }

    #[test]
    fn ranges_are_maximal_runs() {
        let mut assignments = Assignments::default();
        let domain = assignments.create_new_integer_variable_sparse(vec![1, 2, 3, 5, 8, 9]);

        assert_eq!(
            assignments.get_range_iterator(domain).collect::<Vec<_>>(),
            vec![(1, 3), (5, 5), (8, 9)]
        );
        assert_eq!(
            assignments
                .get_reverse_range_iterator(domain)
                .collect::<Vec<_>>(),
            vec![(8, 9), (5, 5), (1, 3)]
        );
    }

    #[test]
    fn next_and_previous_value_skip_holes() {
        let mut assignments = Assignments::default();
        let domain = assignments.create_new_integer_variable_sparse(vec![-2, 4, 10]);

        assert_eq!(assignments.next_value(domain, -5), Some(-2));
        assert_eq!(assignments.next_value(domain, -2), Some(4));
        assert_eq!(assignments.next_value(domain, 10), None);
        assert_eq!(assignments.previous_value(domain, 9), Some(4));
        assert_eq!(assignments.previous_value(domain, -2), None);
        assert_eq!(assignments.previous_value(domain, 50), Some(10));
    }

    #[test]
    fn removed_values_cover_bounds_and_holes() {
        let mut assignments = Assignments::default();
        let domain = assignments.create_new_integer_variable_sparse(vec![0, 1, 2, 4, 6, 7]);
        let _ = assignments
            .remove_value_from_domain(domain, 2, Cause::Decision)
            .expect("non-empty");
        let position = assignments.num_trail_entries();

        let _ = assignments
            .remove_value_from_domain(domain, 4, Cause::Decision)
            .expect("non-empty");
        let _ = assignments
            .tighten_lower_bound(domain, 5, Cause::Decision)
            .expect("non-empty");
        let _ = assignments
            .tighten_upper_bound(domain, 6, Cause::Decision)
            .expect("non-empty");

        let mut removed = assignments
            .removed_values_since(domain, position)
            .collect::<Vec<_>>();
        removed.sort();
        assert_eq!(removed, vec![0, 1, 4, 7]);
    }

    #[test]
    fn events_describe_the_change() {
        let mut assignments = Assignments::default();
        let domain = assignments.create_new_integer_variable_sparse(vec![1, 2, 3]);

        let _ = assignments
            .remove_value_from_domain(domain, 2, Cause::Decision)
            .expect("non-empty");
        let _ = assignments
            .tighten_upper_bound(domain, 2, Cause::Decision)
            .expect("non-empty");

        let events = assignments
            .drain_domain_events()
            .map(|(_, events, _)| events)
            .collect::<Vec<_>>();
        assert_eq!(
            events,
            vec![
                EnumSet::only(DomainEvent::Removal),
                DomainEvent::UpperBound | DomainEvent::Assign,
            ]
        );
    }
}
