use enumset::EnumSet;

use super::AbsView;
use super::TransformableVariable;
use crate::basic_types::Cause;
use crate::basic_types::EmptyDomain;
use crate::containers::StorageKey;
use crate::engine::notifications::DomainEvent;
use crate::engine::notifications::OpaqueDomainEvent;
use crate::engine::notifications::Watchers;
use crate::engine::variables::IntegerVariable;
use crate::engine::Assignments;

/// A structure which represents the most basic [`IntegerVariable`]; it is simply the id which links
/// to a domain (hence the name).
#[derive(Clone, PartialEq, Eq, Copy, Hash, PartialOrd, Ord)]
pub struct DomainId {
    id: u32,
}

impl DomainId {
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl IntegerVariable for DomainId {
    fn lower_bound(&self, assignments: &Assignments) -> i32 {
        assignments.get_lower_bound(*self)
    }

    fn upper_bound(&self, assignments: &Assignments) -> i32 {
        assignments.get_upper_bound(*self)
    }

    fn contains(&self, assignments: &Assignments, value: i32) -> bool {
        assignments.is_value_in_domain(*self, value)
    }

    fn size(&self, assignments: &Assignments) -> usize {
        assignments.get_domain_size(*self)
    }

    fn has_enumerated_domain(&self, assignments: &Assignments) -> bool {
        assignments.is_enumerated(*self)
    }

    fn next_value(&self, assignments: &Assignments, value: i32) -> Option<i32> {
        assignments.next_value(*self, value)
    }

    fn previous_value(&self, assignments: &Assignments, value: i32) -> Option<i32> {
        assignments.previous_value(*self, value)
    }

    fn iterate_domain(&self, assignments: &Assignments) -> impl Iterator<Item = i32> {
        assignments.get_domain_iterator(*self)
    }

    fn iterate_domain_rev(&self, assignments: &Assignments) -> impl Iterator<Item = i32> {
        assignments.get_domain_iterator(*self).rev()
    }

    fn iterate_ranges(&self, assignments: &Assignments) -> impl Iterator<Item = (i32, i32)> {
        assignments.get_range_iterator(*self)
    }

    fn iterate_ranges_rev(&self, assignments: &Assignments) -> impl Iterator<Item = (i32, i32)> {
        assignments.get_reverse_range_iterator(*self)
    }

    fn update_lower_bound(
        &self,
        assignments: &mut Assignments,
        value: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain> {
        assignments.tighten_lower_bound(*self, value, cause)
    }

    fn update_upper_bound(
        &self,
        assignments: &mut Assignments,
        value: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain> {
        assignments.tighten_upper_bound(*self, value, cause)
    }

    fn remove_value(
        &self,
        assignments: &mut Assignments,
        value: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain> {
        assignments.remove_value_from_domain(*self, value, cause)
    }

    fn remove_interval(
        &self,
        assignments: &mut Assignments,
        lower: i32,
        upper: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain> {
        assignments.remove_interval_from_domain(*self, lower, upper, cause)
    }

    fn instantiate_to(
        &self,
        assignments: &mut Assignments,
        value: i32,
        cause: Cause,
    ) -> Result<bool, EmptyDomain> {
        assignments.make_assignment(*self, value, cause)
    }

    fn removed_values_since(
        &self,
        assignments: &Assignments,
        trail_position: usize,
    ) -> impl Iterator<Item = i32> {
        assignments.removed_values_since(*self, trail_position)
    }

    fn watch_all(&self, watchers: &mut Watchers<'_>, events: EnumSet<DomainEvent>) {
        watchers.watch_all(*self, events);
    }

    fn unpack_event(&self, event: OpaqueDomainEvent) -> EnumSet<DomainEvent> {
        event.unwrap()
    }
}

impl TransformableVariable<AbsView<DomainId>> for DomainId {
    fn absolute(&self) -> AbsView<DomainId> {
        AbsView::new(*self)
    }
}

impl StorageKey for DomainId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        DomainId { id: index as u32 }
    }
}

impl std::fmt::Display for DomainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.id)
    }
}

impl std::fmt::Debug for DomainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.id)
    }
}
