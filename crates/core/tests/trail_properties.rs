#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use std::collections::BTreeSet;

use propcore::trailed::TrailedInteger;
use propcore::trailed::TrailedSet;
use propcore::trailed::TrailedValues;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

const NUM_INTEGERS: usize = 3;
const SET_CAPACITY: usize = 8;

/// The expected contents of the trailed values at one checkpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Snapshot {
    integers: Vec<i64>,
    set: BTreeSet<usize>,
}

struct Model {
    values: TrailedValues,
    integers: Vec<TrailedInteger>,
    set: TrailedSet,
    /// The snapshot taken when entering each checkpoint; the last entry is the current state.
    snapshots: Vec<Snapshot>,
}

impl Model {
    fn new() -> Self {
        let mut values = TrailedValues::default();
        let integers = (0..NUM_INTEGERS)
            .map(|index| values.grow(index as i64))
            .collect::<Vec<_>>();
        let set = values.new_set(SET_CAPACITY);

        Model {
            values,
            integers,
            set,
            snapshots: vec![Snapshot {
                integers: (0..NUM_INTEGERS as i64).collect(),
                set: BTreeSet::new(),
            }],
        }
    }

    fn current(&mut self) -> &mut Snapshot {
        self.snapshots.last_mut().expect("there is always a root snapshot")
    }

    fn observed(&self) -> Snapshot {
        Snapshot {
            integers: self
                .integers
                .iter()
                .map(|&integer| self.values.read(integer))
                .collect(),
            set: self.values.set_iter(self.set).collect(),
        }
    }

    fn step(&mut self, rng: &mut SmallRng) {
        match rng.gen_range(0..7) {
            0 => {
                self.values.new_checkpoint();
                let snapshot = self.current().clone();
                self.snapshots.push(snapshot);
            }
            1 if self.values.get_checkpoint() > 0 => {
                let checkpoint = rng.gen_range(0..self.values.get_checkpoint());
                self.values.synchronise(checkpoint);
                self.snapshots.truncate(checkpoint + 1);
            }
            2 => {
                let index = rng.gen_range(0..NUM_INTEGERS);
                let value = rng.gen_range(-5..5);
                self.values.assign(self.integers[index], value);
                self.current().integers[index] = value;
            }
            3 => {
                let index = rng.gen_range(0..NUM_INTEGERS);
                let addition = rng.gen_range(-2..=2);
                self.values.add_assign(self.integers[index], addition);
                self.current().integers[index] += addition;
            }
            4 => {
                let element = rng.gen_range(0..SET_CAPACITY);
                let inserted = self.values.set_insert(self.set, element);
                assert_eq!(inserted, self.current().set.insert(element));
            }
            5 => {
                let element = rng.gen_range(0..SET_CAPACITY);
                let removed = self.values.set_remove(self.set, element);
                assert_eq!(removed, self.current().set.remove(&element));
            }
            _ if rng.gen_bool(0.2) => {
                self.values.set_clear(self.set);
                self.current().set.clear();
            }
            _ => {}
        }
    }
}

#[test]
fn restoring_returns_values_to_their_snapshot() {
    helpers::init_logging();

    for seed in 0..20 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut model = Model::new();

        for _ in 0..500 {
            model.step(&mut rng);

            assert_eq!(model.values.get_checkpoint() + 1, model.snapshots.len());
            let expected = model.current().clone();
            assert_eq!(model.observed(), expected, "seed {seed}");
            assert_eq!(model.values.set_len(model.set), expected.set.len());
        }
    }
}

#[test]
fn repeated_writes_within_a_checkpoint_restore_the_first_value() {
    let mut values = TrailedValues::default();
    let integer = values.grow(10);

    values.new_checkpoint();
    values.assign(integer, 11);
    values.assign(integer, 12);
    values.add_assign(integer, 5);
    assert_eq!(values.read(integer), 17);

    values.new_checkpoint();
    values.assign(integer, 3);

    values.synchronise(1);
    assert_eq!(values.read(integer), 17);

    values.synchronise(0);
    assert_eq!(values.read(integer), 10);
}

#[test]
fn set_changes_are_undone_in_reverse() {
    let mut values = TrailedValues::default();
    let set = values.new_set(4);
    let _ = values.set_insert(set, 1);
    let _ = values.set_insert(set, 3);

    values.new_checkpoint();
    let _ = values.set_remove(set, 1);
    let _ = values.set_insert(set, 0);
    let _ = values.set_insert(set, 1);
    values.set_clear(set);
    assert_eq!(values.set_len(set), 0);

    values.synchronise(0);

    let mut members = values.set_iter(set).collect::<Vec<_>>();
    members.sort();
    assert_eq!(members, vec![1, 3]);
    assert_eq!(values.set_capacity(set), 4);
}
