use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::collections::VecDeque;

use enumset::EnumSet;

use crate::containers::KeyedVec;
use crate::propagation::Priority;
use crate::propagation::PropagationEvent;
use crate::propagation::PropagatorId;
use crate::propcore_assert_moderate;

const NUM_PRIORITY_LEVELS: usize = 4;

/// The queue of propagators which requested a coarse-grained pass.
///
/// A propagator is in the queue at most once; requesting another pass while it is enqueued adds
/// the [`PropagationEvent`]s to the pending pass.
#[derive(Debug, Clone)]
pub(crate) struct PropagatorQueue {
    queues: Vec<VecDeque<PropagatorId>>,
    pending: KeyedVec<PropagatorId, EnumSet<PropagationEvent>>,
    num_enqueued: usize,
    present_priorities: BinaryHeap<Reverse<u32>>,
}

impl Default for PropagatorQueue {
    fn default() -> Self {
        PropagatorQueue {
            queues: vec![VecDeque::new(); NUM_PRIORITY_LEVELS],
            pending: KeyedVec::default(),
            num_enqueued: 0,
            present_priorities: BinaryHeap::new(),
        }
    }
}

impl PropagatorQueue {
    pub(crate) fn is_empty(&self) -> bool {
        self.num_enqueued == 0
    }

    pub(crate) fn enqueue_propagator(
        &mut self,
        propagator_id: PropagatorId,
        priority: Priority,
        events: EnumSet<PropagationEvent>,
    ) {
        propcore_assert_moderate!((priority as usize) < self.queues.len());

        self.pending.accomodate(propagator_id, EnumSet::empty());
        if !self.pending[propagator_id].is_empty() {
            self.pending[propagator_id] |= events;
            return;
        }

        self.pending[propagator_id] = events;
        self.num_enqueued += 1;

        if self.queues[priority as usize].is_empty() {
            self.present_priorities.push(Reverse(priority as u32));
        }
        self.queues[priority as usize].push_back(propagator_id);
    }

    /// Take the propagator with the highest priority, together with the events of its pass.
    pub(crate) fn pop(&mut self) -> Option<(PropagatorId, EnumSet<PropagationEvent>)> {
        let top_priority = self.present_priorities.peek()?.0 as usize;
        propcore_assert_moderate!(!self.queues[top_priority].is_empty());

        let propagator_id = self.queues[top_priority].pop_front()?;
        if self.queues[top_priority].is_empty() {
            let _ = self.present_priorities.pop();
        }
        self.num_enqueued -= 1;

        let events = std::mem::take(&mut self.pending[propagator_id]);
        Some((propagator_id, events))
    }

    pub(crate) fn clear(&mut self) {
        for queue in self.queues.iter_mut() {
            queue.clear();
        }
        for events in self.pending.iter_mut() {
            *events = EnumSet::empty();
        }

        self.present_priorities.clear();
        self.num_enqueued = 0;
    }

    #[cfg(test)]
    fn is_propagator_enqueued(&self, propagator_id: PropagatorId) -> bool {
        self.pending
            .get(propagator_id)
            .is_some_and(|events| !events.is_empty())
    }
}
