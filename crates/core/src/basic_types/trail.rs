use std::iter::Rev;
use std::ops::Deref;
use std::vec::Drain;

use crate::propcore_assert_simple;

/// An append-only log of undo records which is divided into frames, one per checkpoint.
///
/// Restoring to a checkpoint hands back the records of all later frames, newest first, so that
/// the owner can undo them in reverse chronological order.
#[derive(Clone, Debug)]
pub(crate) struct Trail<T> {
    /// At index `i` is the length of the trail when checkpoint `i + 1` was created.
    frame_starts: Vec<usize>,
    records: Vec<T>,
}

// Implemented by hand to avoid requiring `T: Default`.
impl<T> Default for Trail<T> {
    fn default() -> Self {
        Trail {
            frame_starts: Vec::default(),
            records: Vec::default(),
        }
    }
}

impl<T> Trail<T> {
    pub(crate) fn new_checkpoint(&mut self) {
        self.frame_starts.push(self.records.len());
    }

    pub(crate) fn get_checkpoint(&self) -> usize {
        self.frame_starts.len()
    }

    /// The records which were pushed while `checkpoint` was the current checkpoint.
    pub(crate) fn values_at_checkpoint(&self, checkpoint: usize) -> &[T] {
        propcore_assert_simple!(checkpoint <= self.get_checkpoint());

        let start = if checkpoint == 0 {
            0
        } else {
            self.frame_starts[checkpoint - 1]
        };
        let end = self
            .frame_starts
            .get(checkpoint)
            .copied()
            .unwrap_or(self.records.len());

        &self.records[start..end]
    }

    /// Drop all frames after `checkpoint` and return their records, newest first.
    pub(crate) fn synchronise(&mut self, checkpoint: usize) -> Rev<Drain<'_, T>> {
        propcore_assert_simple!(checkpoint < self.get_checkpoint());

        let new_len = self.frame_starts[checkpoint];
        self.frame_starts.truncate(checkpoint);

        self.records.drain(new_len..).rev()
    }

    pub(crate) fn push(&mut self, record: T) {
        self.records.push(record)
    }
}

impl<T> Deref for Trail<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synchronise_returns_records_newest_first() {
        let mut trail = Trail::default();
        trail.push(1);
        trail.new_checkpoint();
        trail.push(2);
        trail.new_checkpoint();
        trail.push(3);
        trail.push(4);

        let undone = trail.synchronise(0).collect::<Vec<_>>();

        assert_eq!(undone, vec![4, 3, 2]);
        assert_eq!(trail.deref(), &[1]);
        assert_eq!(trail.get_checkpoint(), 0);
    }

    #[test]
    fn synchronise_keeps_frames_up_to_the_target() {
        let mut trail = Trail::default();
        trail.new_checkpoint();
        trail.push('a');
        trail.new_checkpoint();
        trail.push('b');
        trail.new_checkpoint();
        trail.push('c');

        let _ = trail.synchronise(1);

        assert_eq!(trail.deref(), &['a']);
        assert_eq!(trail.get_checkpoint(), 1);
    }

    #[test]
    fn records_are_grouped_per_checkpoint() {
        let mut trail = Trail::default();
        trail.push(1);
        trail.new_checkpoint();
        trail.new_checkpoint();
        trail.push(2);
        trail.push(3);

        assert_eq!(trail.values_at_checkpoint(0), &[1]);
        assert!(trail.values_at_checkpoint(1).is_empty());
        assert_eq!(trail.values_at_checkpoint(2), &[2, 3]);
    }
}
