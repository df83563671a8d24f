use super::TrailedInteger;
use super::TrailedSet;

/// An undo record of [`super::TrailedValues`].
#[derive(Debug, Clone)]
pub(crate) enum TrailedChange {
    /// The first write to an integer in a frame; holds the value and stamp before that write.
    Integer {
        reference: TrailedInteger,
        old_value: i64,
        old_stamp: u64,
    },
    /// The element was added to the set, undone by removing it.
    SetInsertion {
        reference: TrailedSet,
        element: usize,
    },
    /// The element was removed from the set, undone by adding it back.
    SetRemoval {
        reference: TrailedSet,
        element: usize,
    },
}
