use std::collections::hash_map::Entry;
use std::collections::VecDeque;

use enumset::EnumSet;
use log::trace;

use super::DomainEvent;
use crate::containers::HashMap;
use crate::containers::KeyedVec;
use crate::engine::variables::DomainId;
use crate::engine::Assignments;
use crate::propagation::PropagatorVarId;

#[derive(Debug, Clone, Copy)]
struct Watcher {
    propagator_var: PropagatorVarId,
    events: EnumSet<DomainEvent>,
}

/// Dispatches the domain events recorded by the [`Assignments`] to the propagators which watch
/// the affected domains.
///
/// Every (propagator, local id) pair has at most one pending notification; events which arrive
/// while it is pending are merged into it, and the notification keeps its place in the queue.
#[derive(Debug, Clone, Default)]
pub(crate) struct NotificationEngine {
    watch_lists: KeyedVec<DomainId, Vec<Watcher>>,
    queue: VecDeque<PropagatorVarId>,
    pending: HashMap<PropagatorVarId, EnumSet<DomainEvent>>,
    /// Whether a propagator is notified of the events it caused itself.
    skip_own_events: bool,
}

impl NotificationEngine {
    pub(crate) fn new(skip_own_events: bool) -> Self {
        NotificationEngine {
            skip_own_events,
            ..Default::default()
        }
    }

    /// Allocate a watch list for a newly created domain.
    pub(crate) fn grow(&mut self) {
        let _ = self.watch_lists.push(Vec::new());
    }

    pub(crate) fn watch(
        &mut self,
        domain: DomainId,
        propagator_var: PropagatorVarId,
        events: EnumSet<DomainEvent>,
    ) {
        let watch_list = &mut self.watch_lists[domain];
        match watch_list
            .iter_mut()
            .find(|watcher| watcher.propagator_var == propagator_var)
        {
            Some(watcher) => watcher.events |= events,
            None => watch_list.push(Watcher {
                propagator_var,
                events,
            }),
        }
    }

    /// Move the domain events recorded since the last call into the notification queue.
    pub(crate) fn notify_propagators_about_domain_events(&mut self, assignments: &mut Assignments) {
        for (domain, events, cause) in assignments.drain_domain_events() {
            for watcher in self.watch_lists[domain].iter() {
                if self.skip_own_events
                    && cause.propagator() == Some(watcher.propagator_var.propagator)
                {
                    continue;
                }

                let relevant = watcher.events & events;
                if relevant.is_empty() {
                    continue;
                }

                trace!(
                    "{domain} changed by {cause}: notify {} (local id {}) of {relevant:?}",
                    watcher.propagator_var.propagator,
                    watcher.propagator_var.variable,
                );

                match self.pending.entry(watcher.propagator_var) {
                    Entry::Occupied(mut entry) => *entry.get_mut() |= relevant,
                    Entry::Vacant(entry) => {
                        let _ = entry.insert(relevant);
                        self.queue.push_back(watcher.propagator_var);
                    }
                }
            }
        }
    }

    /// Take the oldest pending notification together with all events accumulated for it.
    pub(crate) fn pop_event(&mut self) -> Option<(PropagatorVarId, EnumSet<DomainEvent>)> {
        let propagator_var = self.queue.pop_front()?;
        let events = self.pending.remove(&propagator_var).unwrap_or_default();
        Some((propagator_var, events))
    }

    pub(crate) fn has_pending_events(&self) -> bool {
        !self.queue.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.queue.clear();
        self.pending.clear();
    }
}

/// Used to subscribe a propagator to the events of the domains underlying a variable.
#[derive(Debug)]
pub struct Watchers<'a> {
    propagator_var: PropagatorVarId,
    notification_engine: &'a mut NotificationEngine,
}

impl<'a> Watchers<'a> {
    pub(crate) fn new(
        propagator_var: PropagatorVarId,
        notification_engine: &'a mut NotificationEngine,
    ) -> Self {
        Watchers {
            propagator_var,
            notification_engine,
        }
    }

    pub fn watch_all(&mut self, domain: DomainId, events: EnumSet<DomainEvent>) {
        self.notification_engine
            .watch(domain, self.propagator_var, events);
    }
}

#[cfg(test)]
mod tests {
    use enumset::enum_set;

    use super::*;
    use crate::basic_types::Cause;
    use crate::propagation::LocalId;
    use crate::propagation::PropagatorId;

    fn propagator_var(propagator: u32, variable: u32) -> PropagatorVarId {
        PropagatorVarId {
            propagator: PropagatorId(propagator),
            variable: LocalId::from(variable),
        }
    }

    #[test]
    fn events_for_the_same_watcher_are_merged() {
        let mut assignments = Assignments::default();
        let mut engine = NotificationEngine::default();
        let domain = assignments.grow(0, 10);
        engine.grow();
        engine.watch(domain, propagator_var(0, 0), DomainEvent::LowerBound.into());
        engine.watch(domain, propagator_var(0, 0), DomainEvent::UpperBound.into());

        let _ = assignments
            .tighten_lower_bound(domain, 2, Cause::Decision)
            .expect("non-empty");
        let _ = assignments
            .tighten_upper_bound(domain, 8, Cause::Decision)
            .expect("non-empty");
        engine.notify_propagators_about_domain_events(&mut assignments);

        assert_eq!(
            engine.pop_event(),
            Some((
                propagator_var(0, 0),
                enum_set!(DomainEvent::LowerBound | DomainEvent::UpperBound)
            ))
        );
        assert_eq!(engine.pop_event(), None);
    }

    #[test]
    fn irrelevant_events_are_not_delivered() {
        let mut assignments = Assignments::default();
        let mut engine = NotificationEngine::default();
        let domain = assignments.grow(0, 10);
        engine.grow();
        engine.watch(domain, propagator_var(0, 1), DomainEvent::Assign.into());

        let _ = assignments
            .tighten_lower_bound(domain, 2, Cause::Decision)
            .expect("non-empty");
        engine.notify_propagators_about_domain_events(&mut assignments);

        assert!(!engine.has_pending_events());
    }

    #[test]
    fn own_events_can_be_skipped() {
        let mut assignments = Assignments::default();
        let mut engine = NotificationEngine::new(true);
        let domain = assignments.grow(0, 10);
        engine.grow();
        engine.watch(domain, propagator_var(0, 0), EnumSet::all());
        engine.watch(domain, propagator_var(1, 0), EnumSet::all());

        let _ = assignments
            .tighten_lower_bound(domain, 2, Cause::Propagator(PropagatorId(0)))
            .expect("non-empty");
        engine.notify_propagators_about_domain_events(&mut assignments);

        assert_eq!(
            engine.pop_event().map(|(propagator_var, _)| propagator_var),
            Some(propagator_var(1, 0))
        );
        assert_eq!(engine.pop_event(), None);
    }
}
