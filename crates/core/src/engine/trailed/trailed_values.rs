use super::trailed_set::SparseSetStorage;
use super::TrailedChange;
use super::TrailedInteger;
use super::TrailedSet;
use crate::basic_types::Trail;
use crate::containers::KeyedVec;
use crate::propcore_assert_moderate;

/// Stamp of cells which have never been written.
const NEVER_WRITTEN: u64 = u64::MAX;

#[derive(Debug, Clone, Copy)]
struct StampedValue {
    value: i64,
    /// The frame in which the value was last saved to the trail.
    stamp: u64,
}

/// The store of all trailed integers and sets.
///
/// Integers save their previous value at most once per checkpoint: every checkpoint receives a
/// fresh stamp, and a write only records the old value if the integer was not yet saved under
/// the current stamp. Sets record every effective insertion and removal, so restoring a set costs
/// time proportional to the number of changes since the checkpoint.
#[derive(Debug, Clone)]
pub struct TrailedValues {
    trail: Trail<TrailedChange>,
    integers: KeyedVec<TrailedInteger, StampedValue>,
    sets: KeyedVec<TrailedSet, SparseSetStorage>,
    /// The stamp of every active checkpoint; the last one is the current frame.
    stamps: Vec<u64>,
    next_stamp: u64,
}

impl Default for TrailedValues {
    fn default() -> Self {
        TrailedValues {
            trail: Trail::default(),
            integers: KeyedVec::default(),
            sets: KeyedVec::default(),
            stamps: vec![0],
            next_stamp: 1,
        }
    }
}

impl TrailedValues {
    /// Create a new trailed integer with the given value.
    ///
    /// The integer does not disappear when restoring to a checkpoint before its creation.
    pub fn grow(&mut self, initial_value: i64) -> TrailedInteger {
        self.integers.push(StampedValue {
            value: initial_value,
            stamp: NEVER_WRITTEN,
        })
    }

    /// Create a new, empty, trailed set over the elements `0..capacity`.
    pub fn new_set(&mut self, capacity: usize) -> TrailedSet {
        self.sets.push(SparseSetStorage::new(capacity))
    }

    pub fn get_checkpoint(&self) -> usize {
        self.trail.get_checkpoint()
    }

    pub fn new_checkpoint(&mut self) {
        self.trail.new_checkpoint();
        self.stamps.push(self.next_stamp);
        self.next_stamp += 1;
    }

    /// Restore every integer and set to the value it had at the end of `checkpoint`.
    pub fn synchronise(&mut self, checkpoint: usize) {
        for change in self.trail.synchronise(checkpoint) {
            match change {
                TrailedChange::Integer {
                    reference,
                    old_value,
                    old_stamp,
                } => {
                    self.integers[reference] = StampedValue {
                        value: old_value,
                        stamp: old_stamp,
                    };
                }
                TrailedChange::SetInsertion { reference, element } => {
                    let _ = self.sets[reference].remove(element);
                }
                TrailedChange::SetRemoval { reference, element } => {
                    let _ = self.sets[reference].insert(element);
                }
            }
        }
        self.stamps.truncate(checkpoint + 1);
    }

    /// The number of undo records in the frame of `checkpoint`.
    pub fn num_changes_at_checkpoint(&self, checkpoint: usize) -> usize {
        self.trail.values_at_checkpoint(checkpoint).len()
    }

    fn current_stamp(&self) -> u64 {
        self.stamps.last().copied().unwrap_or_default()
    }
}

/// Operations on trailed integers.
impl TrailedValues {
    pub fn read(&self, trailed_integer: TrailedInteger) -> i64 {
        self.integers[trailed_integer].value
    }

    pub fn assign(&mut self, trailed_integer: TrailedInteger, value: i64) {
        let current_stamp = self.current_stamp();
        let cell = self.integers[trailed_integer];
        if cell.value == value {
            return;
        }

        if cell.stamp != current_stamp {
            self.trail.push(TrailedChange::Integer {
                reference: trailed_integer,
                old_value: cell.value,
                old_stamp: cell.stamp,
            });
        }

        self.integers[trailed_integer] = StampedValue {
            value,
            stamp: current_stamp,
        };
    }

    pub fn add_assign(&mut self, trailed_integer: TrailedInteger, addition: i64) {
        self.assign(trailed_integer, self.read(trailed_integer) + addition);
    }
}

/// Operations on trailed sets.
impl TrailedValues {
    pub fn set_contains(&self, set: TrailedSet, element: usize) -> bool {
        self.sets[set].contains(element)
    }

    pub fn set_len(&self, set: TrailedSet) -> usize {
        self.sets[set].len()
    }

    pub fn set_capacity(&self, set: TrailedSet) -> usize {
        self.sets[set].capacity()
    }

    /// Iterate over the current members of the set in unspecified order.
    pub fn set_iter(&self, set: TrailedSet) -> impl Iterator<Item = usize> + '_ {
        self.sets[set].iter()
    }

    /// Add `element` to the set; returns `true` if it was not yet a member.
    pub fn set_insert(&mut self, set: TrailedSet, element: usize) -> bool {
        propcore_assert_moderate!(
            element < self.sets[set].capacity(),
            "element {element} is outside of the universe of {set:?}"
        );

        let inserted = self.sets[set].insert(element);
        if inserted {
            self.trail.push(TrailedChange::SetInsertion {
                reference: set,
                element,
            });
        }
        inserted
    }

    /// Remove `element` from the set; returns `true` if it was a member.
    pub fn set_remove(&mut self, set: TrailedSet, element: usize) -> bool {
        let removed = self.sets[set].remove(element);
        if removed {
            self.trail.push(TrailedChange::SetRemoval {
                reference: set,
                element,
            });
        }
        removed
    }

    pub fn set_clear(&mut self, set: TrailedSet) {
        let members = self.sets[set].iter().collect::<Vec<_>>();
        for element in members {
            let _ = self.set_remove(set, element);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TrailedValues;

    #[test]
    fn integers_are_restored_per_checkpoint() {
        let mut trailed_values = TrailedValues::default();
        let trailed_integer = trailed_values.grow(0);

        trailed_values.new_checkpoint();
        trailed_values.add_assign(trailed_integer, 5);
        trailed_values.add_assign(trailed_integer, 5);
        assert_eq!(trailed_values.read(trailed_integer), 10);

        trailed_values.new_checkpoint();
        trailed_values.add_assign(trailed_integer, 1);
        assert_eq!(trailed_values.read(trailed_integer), 11);

        trailed_values.synchronise(1);
        assert_eq!(trailed_values.read(trailed_integer), 10);

        trailed_values.synchronise(0);
        assert_eq!(trailed_values.read(trailed_integer), 0);
    }

    #[test]
    fn integers_are_saved_once_per_checkpoint() {
        let mut trailed_values = TrailedValues::default();
        let trailed_integer = trailed_values.grow(3);

        trailed_values.new_checkpoint();
        for value in 4..10 {
            trailed_values.assign(trailed_integer, value);
        }

        assert_eq!(trailed_values.num_changes_at_checkpoint(1), 1);
    }

    #[test]
    fn writes_after_restoring_are_saved_again() {
        let mut trailed_values = TrailedValues::default();
        let trailed_integer = trailed_values.grow(1);

        trailed_values.new_checkpoint();
        trailed_values.assign(trailed_integer, 2);
        trailed_values.new_checkpoint();
        trailed_values.assign(trailed_integer, 3);
        trailed_values.synchronise(1);

        // Still in the frame of checkpoint 1, which already saved the value 1.
        trailed_values.assign(trailed_integer, 4);
        trailed_values.new_checkpoint();
        trailed_values.assign(trailed_integer, 5);

        trailed_values.synchronise(1);
        assert_eq!(trailed_values.read(trailed_integer), 4);
        trailed_values.synchronise(0);
        assert_eq!(trailed_values.read(trailed_integer), 1);
    }

    #[test]
    fn set_changes_are_undone() {
        let mut trailed_values = TrailedValues::default();
        let set = trailed_values.new_set(6);
        let _ = trailed_values.set_insert(set, 1);
        let _ = trailed_values.set_insert(set, 4);

        trailed_values.new_checkpoint();
        let _ = trailed_values.set_remove(set, 1);
        let _ = trailed_values.set_insert(set, 5);

        trailed_values.new_checkpoint();
        trailed_values.set_clear(set);
        let _ = trailed_values.set_insert(set, 2);
        assert_eq!(trailed_values.set_iter(set).collect::<Vec<_>>(), vec![2]);

        trailed_values.synchronise(1);
        let mut members = trailed_values.set_iter(set).collect::<Vec<_>>();
        members.sort();
        assert_eq!(members, vec![4, 5]);

        trailed_values.synchronise(0);
        let mut members = trailed_values.set_iter(set).collect::<Vec<_>>();
        members.sort();
        assert_eq!(members, vec![1, 4]);
        assert!(!trailed_values.set_contains(set, 5));
        assert_eq!(trailed_values.set_len(set), 2);
    }

    #[test]
    fn cells_created_at_a_checkpoint_survive_restoring() {
        let mut trailed_values = TrailedValues::default();
        trailed_values.new_checkpoint();
        let trailed_integer = trailed_values.grow(7);
        trailed_values.assign(trailed_integer, 8);

        trailed_values.synchronise(0);

        assert_eq!(trailed_values.read(trailed_integer), 7);
    }
}
